use std::fmt::Display;

use colored::*;
use edgescan_common::edge::record::EdgeRecord;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 10;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn banner() {
    let text_content: String = format!("⟦ EDGESCAN v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();

    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

/// One tree per node: address as the head, details as branches.
pub fn edge_tree(idx: usize, record: &EdgeRecord) {
    let probe = &record.probe;
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    print(&format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        probe.addr.to_string().color(colors::IPV4_ADDR)
    ));

    let location = match (&probe.city, &probe.region) {
        (Some(city), Some(region)) => format!("{city}, {region}"),
        (Some(city), None) => city.clone(),
        _ => "unknown".to_string(),
    };

    let mut branches: Vec<(&str, ColoredString)> = vec![
        ("Colo", probe.colo.color(colors::DATACENTER)),
        ("Location", location.normal()),
        ("Latency", probe.latency_label().color(colors::LATENCY)),
    ];
    if let Some(speed) = record.throughput_label() {
        branches.push(("Speed", speed.color(colors::THROUGHPUT)));
    }

    as_tree_one_level(&branches);
}

fn as_tree_one_level(key_value_pair: &[(&str, ColoredString)]) {
    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(9usize.saturating_sub(key.len())).color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

const NO_RESULTS: &str = r#"
         _   _  ___    _   _  ___  ____  _____ ____
        | \ | |/ _ \  | \ | |/ _ \|  _ \| ____/ ___|
        |  \| | | | | |  \| | | | | | | |  _| \___ \
        | |\  | |_| | | |\  | |_| | |_| | |___ ___) |
        |_| \_|\___/  |_| \_|\___/|____/|_____|____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS.red().bold()));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
