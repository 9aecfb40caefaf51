use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Order size in whole lots
pub type Quantity = u64;
