use std::collections::BTreeMap;

use colored::Colorize;
use console::Alignment;

use crate::remote::Remote;

/// Print the saved catalog: one row per spec, decoded where possible.
pub fn print_spec_list(remotes: &BTreeMap<String, String>) {
    if remotes.is_empty() {
        println!("{}", "No saved specs in ~/.burrow/config.toml".yellow());
        println!("Add one with `burrow add <name> <spec>` to get started.");
        return;
    }

    // Pre-compute all row data; the file is hand-editable, so a saved spec
    // may no longer decode.
    let mut rows: Vec<Row> = Vec::new();
    for (name, spec) in remotes {
        let decoded = spec.parse::<Remote>();
        rows.push(Row {
            name: name.clone(),
            spec: spec.clone(),
            decoded,
        });
    }

    // Column widths from plain text
    let w_name = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    let w_decoded = rows
        .iter()
        .map(|r| match &r.decoded {
            Ok(remote) => remote.to_string().len(),
            Err(e) => e.to_string().len(),
        })
        .max()
        .unwrap_or(0);

    for row in &rows {
        let ok = row.decoded.is_ok();
        let bullet = if ok {
            "●".green().to_string()
        } else {
            "✗".red().to_string()
        };

        let name_colored = if ok {
            row.name.green().bold().to_string()
        } else {
            row.name.red().bold().to_string()
        };
        let name_pad = pad(&name_colored, w_name);

        let (decoded_colored, badge) = match &row.decoded {
            Ok(remote) => {
                let badge = if remote.socks {
                    "  [socks]".dimmed().to_string()
                } else if !remote.proxy.is_empty() {
                    format!("  [via {}]", remote.proxy).dimmed().to_string()
                } else {
                    String::new()
                };
                (remote.to_string(), badge)
            }
            Err(e) => (e.to_string().red().to_string(), String::new()),
        };
        let decoded_pad = pad(&decoded_colored, w_decoded);

        let spec = row.spec.dimmed().to_string();

        println!("  {} {}  {}  {}{}", bullet, name_pad, decoded_pad, spec, badge);
    }
}

/// Pad an ANSI-colored string to a visible width using console's awareness of escape codes.
fn pad(s: &str, width: usize) -> String {
    console::pad_str(s, width, Alignment::Left, None).to_string()
}

struct Row {
    name: String,
    spec: String,
    decoded: Result<Remote, crate::remote::DecodeError>,
}
