pub mod mizan;
pub mod muqtafi;

pub use mizan::Mizan;
pub use mizan::MizanArgs;
pub use muqtafi::Muqtafi;
pub use muqtafi::MuqtafiArgs;
