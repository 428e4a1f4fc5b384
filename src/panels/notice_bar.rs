use std::collections::VecDeque;

use crate::SnapmarkApp;
use crate::controller::Notice;

/// Older notices are dropped past this many
const MAX_VISIBLE: usize = 3;

/// Notices waiting for the user, oldest first
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, notice: Notice) {
        self.notices.push_back(notice);
        while self.notices.len() > MAX_VISIBLE {
            self.notices.pop_front();
        }
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.push(notice);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn dismiss(&mut self, index: usize) {
        self.notices.remove(index);
    }
}

pub fn notice_bar(app: &mut SnapmarkApp, ctx: &egui::Context) {
    if app.notices().is_empty() {
        return;
    }
    let notices: Vec<Notice> = app.notices().iter().cloned().collect();

    egui::TopBottomPanel::bottom("notice_bar").show(ctx, |ui| {
        let mut dismissed = None;
        for (index, notice) in notices.iter().enumerate() {
            ui.horizontal(|ui| {
                match notice {
                    Notice::Loaded => ui.label("Image loaded"),
                    Notice::Copied => ui.label("Copied to clipboard"),
                    Notice::Saved(path) => ui.label(format!("Saved to {}", path.display())),
                    Notice::PermissionRequired => {
                        ui.colored_label(ui.visuals().warn_fg_color, "Screen capture permission is required")
                    }
                    Notice::Failed(message) => ui.colored_label(ui.visuals().error_fg_color, message),
                };

                if *notice == Notice::PermissionRequired && ui.button("Open Settings").clicked() {
                    app.controller().open_permission_settings();
                }
                if ui.small_button("✖").clicked() {
                    dismissed = Some(index);
                }
            });
        }
        if let Some(index) = dismissed {
            app.dismiss_notice(index);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_every_notice_of_a_frame() {
        let mut board = NoticeBoard::default();
        board.extend(vec![Notice::Failed("Read image failed".into()), Notice::Loaded]);
        let shown: Vec<_> = board.iter().cloned().collect();
        assert_eq!(shown, vec![Notice::Failed("Read image failed".into()), Notice::Loaded]);
    }

    #[test]
    fn oldest_notices_make_room() {
        let mut board = NoticeBoard::default();
        board.extend(vec![Notice::PermissionRequired, Notice::Loaded, Notice::Copied, Notice::Loaded]);
        assert_eq!(board.len(), MAX_VISIBLE);
        assert_eq!(board.iter().next(), Some(&Notice::Loaded));
    }

    #[test]
    fn dismiss_removes_one() {
        let mut board = NoticeBoard::default();
        board.extend(vec![Notice::Copied, Notice::Loaded]);
        board.dismiss(0);
        assert_eq!(board.iter().collect::<Vec<_>>(), vec![&Notice::Loaded]);
    }
}
