use setlist_core::{AppViewModel, ErrorKind, InputHint, JobStatus, ResultView};

/// Turns successive view models into terminal lines, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    last: AppViewModel,
}

impl Renderer {
    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        let last = &self.last;

        if view.input_hint != last.input_hint {
            if let Some(hint) = view.input_hint {
                lines.push(hint_text(hint).to_string());
            }
        }

        if view.status != last.status && view.status == JobStatus::Submitting {
            lines.push("Creating playlist...".to_string());
        }

        if view.latest_progress != last.latest_progress {
            if let Some(progress) = &view.latest_progress {
                lines.push(format!("  {progress}"));
            }
        }

        if view.result != last.result {
            if let Some(result) = &view.result {
                lines.extend(result_lines(result));
            }
        }

        if view.error != last.error {
            if let Some(error) = &view.error {
                lines.push(format!("Error: {}", error.message));
                lines.push(error_hint(error.kind).to_string());
            }
        }

        if view.counter != last.counter {
            if let Some(count) = view.counter {
                lines.push(format!("{} playlists created so far", format_with_commas(count)));
            }
        }

        self.last = view.clone();
        lines
    }
}

fn hint_text(hint: InputHint) -> &'static str {
    match hint {
        InputHint::InvalidFormat => {
            "Not a setlist.fm setlist URL. Expected https://www.setlist.fm/setlist/<artist>/<year>/<venue>.html"
        }
        InputHint::AverageSetlist => {
            "Average setlists cannot be converted. Open one concrete setlist of the tour instead."
        }
    }
}

fn error_hint(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::TransportError | ErrorKind::Timeout => {
            "The service could not be reached. Try again in a moment."
        }
        ErrorKind::ServerRejected => "The setlist could not be converted. Check the URL and try again.",
        ErrorKind::PayloadMalformed => "The service sent an unexpected answer. Try again later.",
    }
}

fn result_lines(result: &ResultView) -> Vec<String> {
    let mut lines = vec![result.headline.clone(), result.summary.clone()];
    for row in &result.rows {
        let marker = if row.is_match { '+' } else { '-' };
        lines.push(format!(
            "  {marker} {:>2}. {} [{}]",
            row.index,
            row.name,
            row.label
        ));
    }
    lines.push(result.playlist_url.clone());
    lines
}

/// `1234567` → `"1,234,567"`.
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
