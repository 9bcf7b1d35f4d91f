pub(crate) mod command;
pub(crate) mod device_state;
pub(crate) mod file_entry;
pub(crate) mod forward_item;

pub use command::AdbCommand;
pub use device_state::DeviceState;
pub use file_entry::RemoteFileEntry;
pub use forward_item::ForwardItem;
