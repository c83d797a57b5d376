//! Building blocks of the `whisker` command line tool.
pub mod evaluate;
pub mod predict;
pub mod report;
pub mod train;
pub mod util;
