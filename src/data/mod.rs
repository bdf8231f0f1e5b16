pub mod data_registry;
pub mod gamemaster;
pub mod rankings_io;

pub use data_registry::{DataRegistry, DEFAULT_BAN_LIST};
pub use gamemaster::{load_gamemaster, GameMasterFile, DEFAULT_GAMEMASTER_PATH};
