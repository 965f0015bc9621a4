pub mod ask;
pub mod exec;
pub mod explain;
pub mod report;
pub mod run;
pub mod suggest;
pub mod tools;
