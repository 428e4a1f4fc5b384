#![warn(clippy::all, rust_2018_idioms)]

pub mod annotation;
pub mod app;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod expansion;
pub mod export;
pub mod file_handler;
pub mod fonts;
pub mod geometry;
pub mod id_generator;
pub mod image_source;
pub mod mosaic;
pub mod panels;
pub mod renderer;
pub mod shell;
pub mod state;
pub mod surface;
pub mod texture_manager;
pub mod tools;

pub use annotation::{Annotation, AnnotationKind, Element};
pub use app::SnapmarkApp;
pub use command::{Command, CommandContext};
pub use config::EditorConfig;
pub use controller::{EditorController, Notice};
pub use error::{EditorError, EditorResult};
pub use export::{ExportError, ExportFormat, FlattenedExport};
pub use geometry::DisplayTransform;
pub use id_generator::AnnotationId;
pub use image_source::SourceImage;
pub use renderer::Renderer;
pub use shell::{Shell, ShellError};
pub use state::EditorState;
pub use surface::{BackgroundImage, Surface};
pub use tools::{Tool, ToolKind};
