pub mod classify;
pub mod error;
pub mod features;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod selector;
pub mod similarity;
