mod fill;
mod order;
mod side;

pub use fill::LastFill;
pub use order::{OrderId, OrderRecord};
pub use side::Side;
