use thiserror::Error;

use crate::export::ExportError;
use crate::id_generator::AnnotationId;
use crate::image_source::ImageLoadError;
use crate::mosaic::MosaicError;
use crate::shell::{RequestKind, ShellError};

/// Errors surfaced by the editor core
#[derive(Debug, Error)]
pub enum EditorError {
    /// An operation needs a background image and none is loaded
    #[error("no image is loaded")]
    NoImage,
    /// The referenced annotation no longer exists
    #[error("annotation {0} not found")]
    AnnotationNotFound(AnnotationId),
    /// Geometry was rejected, e.g. a resize below the minimum size
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A boundary call of the same kind has not completed yet
    #[error("a {0} request is already in flight")]
    RequestInFlight(RequestKind),
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    #[error(transparent)]
    Mosaic(#[from] MosaicError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Shell(#[from] ShellError),
}

pub type EditorResult<T = ()> = Result<T, EditorError>;
