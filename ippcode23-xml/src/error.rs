use ippcode23::Status;

/// Errors the XML loader can report before an instruction stream ever
/// reaches the core's validator.
///
/// `Malformed` covers XML that is not well-formed at all (unclosed tags,
/// invalid byte stream); `Schema` covers structural violations the loader
/// can detect purely from tree shape (wrong root element, misplaced or
/// duplicate elements, more than three `arg` children).
#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("source is not well-formed XML: {0}")]
    Malformed(String),
    #[error("source violates the IPPcode23 XML schema: {0}")]
    Schema(String),
}

impl From<quick_xml::Error> for LoaderError {
    fn from(err: quick_xml::Error) -> LoaderError {
        LoaderError::Malformed(err.to_string())
    }
}

impl LoaderError {
    /// The terminal status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            LoaderError::Malformed(_) => Status::Malformed,
            LoaderError::Schema(_) => Status::InvalidXml,
        }
    }
}
