//! Skeleton overlay geometry for drawing landmarks over the camera view.

use crate::sample::Landmark;

/// Landmarks at or below this visibility are not drawn.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

/// Landmark index pairs joined by a line: shoulders, both arms, and each ear
/// to its shoulder.
pub const POSE_CONNECTIONS: [(usize, usize); 7] = [
    (11, 12),
    (11, 13),
    (13, 15),
    (12, 14),
    (14, 16),
    (8, 12),
    (7, 11),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Markers and connecting lines projected onto a surface of a given size.
/// `y` grows downward, as in image coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub width: f64,
    pub height: f64,
    pub markers: Vec<Point>,
    pub segments: Vec<Segment>,
}

fn is_visible(landmark: &Landmark) -> bool {
    landmark.visibility > VISIBILITY_THRESHOLD
}

impl Overlay {
    pub fn project(landmarks: &[Landmark], width: f64, height: f64) -> Self {
        let to_point = |lm: &Landmark| Point {
            x: lm.x * width,
            y: lm.y * height,
        };

        let markers = landmarks
            .iter()
            .filter(|lm| is_visible(lm))
            .map(to_point)
            .collect();

        let segments = POSE_CONNECTIONS
            .iter()
            .filter_map(|&(i, j)| {
                let start = landmarks.get(i)?;
                let end = landmarks.get(j)?;
                (is_visible(start) && is_visible(end)).then(|| Segment {
                    from: to_point(start),
                    to: to_point(end),
                })
            })
            .collect();

        Self {
            width,
            height,
            markers,
            segments,
        }
    }
}
