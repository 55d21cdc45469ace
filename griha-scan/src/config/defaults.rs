//! Default value functions for serde deserialization.

pub fn join_tolerance() -> f32 {
    0.10
}

pub fn close_tolerance() -> f32 {
    0.15
}

pub fn square_tolerance_deg() -> f32 {
    4.0
}

pub fn angle_sum_tolerance_deg() -> f32 {
    0.5
}

pub fn max_misclosure_ratio() -> f32 {
    0.05
}

pub fn min_wall_length() -> f32 {
    0.01
}

pub fn worker_queue() -> usize {
    64
}

pub fn wall_touch() -> f32 {
    1.0
}

pub fn brick_mode() -> f32 {
    0.5
}

pub fn room_plan() -> f32 {
    0.75
}

pub fn draw_manually() -> f32 {
    0.25
}

pub fn margin() -> f32 {
    36.0
}

pub fn default_ceiling_height() -> f32 {
    2.4
}

pub fn report_title() -> String {
    "Floor Plan".to_string()
}

pub fn file_name() -> String {
    "property.rugsfile".to_string()
}

pub fn document_dir() -> String {
    ".".to_string()
}
