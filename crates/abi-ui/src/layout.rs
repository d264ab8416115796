use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRects {
    pub face: Rect,
    pub status: Rect,
}

/// Split the screen into the face area and a one-row status bar below it.
pub fn face_layout(area: Rect) -> FaceRects {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // face
            Constraint::Length(1), // status bar
        ])
        .split(area);

    FaceRects {
        face: chunks[0],
        status: chunks[1],
    }
}
