use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Message {
    PathInputChanged(String),
    Submit,
    FileDropped(PathBuf),
    DescriptionReady(String),
}
