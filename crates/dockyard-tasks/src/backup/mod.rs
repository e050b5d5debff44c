//! Backup maintenance helpers.

mod hardlinks;

pub use hardlinks::{
    HardlinkError, HardlinkGroup, HardlinkOptions, find_hardlinks, open_output, write_report,
};
