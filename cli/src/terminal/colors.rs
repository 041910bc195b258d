use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 120, g: 200, b: 255 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 200, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::TrueColor { r: 140, g: 230, b: 140 };
pub const DATACENTER: Color = Color::TrueColor { r: 255, g: 160, b: 200 };
pub const LATENCY: Color = Color::Yellow;
pub const THROUGHPUT: Color = Color::Cyan;
