//! Host filesystem helpers for the emulated DOS drive.
//!
//! - `dos_name`: 8.3 file names
//! - `dos_path`: common ancestor search and `C:\` path synthesis
//! - `temp_files`: collision-free temp files inside the drive root

mod dos_name;
mod dos_path;
mod temp_files;

pub use dos_name::{is_8_3, is_reserved_device, random_base_name, BASE_NAME_LEN};
pub use dos_path::{common_ancestor, relative_dos_path, DOS_DRIVE};
pub use temp_files::{TempFile, TempFiles};
