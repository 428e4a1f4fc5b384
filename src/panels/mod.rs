mod central_panel;
mod notice_bar;
mod tools_panel;

pub use central_panel::central_panel;
pub use notice_bar::{NoticeBoard, notice_bar};
pub use tools_panel::tools_panel;
