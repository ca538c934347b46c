use serde::Serialize;

use crate::state::{Phase, StatusMessage, UiState};

/// Everything the page shows, derived from [`UiState`] and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub phase: Phase,
    pub status: Option<StatusMessage>,
    pub preview: Option<String>,
    pub preview_id: Option<u64>,
    pub caption: Option<String>,
    pub result_panel_visible: bool,
    pub busy: bool,
}

impl From<&UiState> for View {
    fn from(state: &UiState) -> Self {
        Self {
            phase: state.phase(),
            status: state.status().cloned(),
            preview: state.preview().map(str::to_owned),
            preview_id: state.preview_id(),
            caption: state.caption().map(str::to_owned),
            result_panel_visible: state.result_panel_visible(),
            busy: state.is_busy(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(view: &View) -> String {
    let refresh = if view.busy {
        r#"<meta http-equiv="refresh" content="1">"#
    } else {
        ""
    };

    let status = match &view.status {
        Some(status) => format!(
            r#"<p id="status" class="status{}" role="status">{}</p>"#,
            if status.is_error { " error" } else { "" },
            escape_html(&status.text)
        ),
        None => r#"<p id="status" class="status" role="status"></p>"#.to_string(),
    };

    // The image is served from `/preview`; the id keeps the URL stable across
    // refreshes and changes when another file is previewed.
    let preview = match view.preview_id {
        Some(id) => format!(
            r#"<img id="preview-image" class="preview-image" alt="Selected image preview" src="/preview?v={id}">"#
        ),
        None => String::new(),
    };

    let caption = match &view.caption {
        Some(text) => format!(
            r#"<div class="caption">
                <div class="caption-label">Generated Caption</div>
                <p id="caption-text" class="caption-text">{}</p>
            </div>"#,
            escape_html(text)
        ),
        None => String::new(),
    };

    let hidden = if view.result_panel_visible { "" } else { " hidden" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {refresh}
    <title>Image Caption Generator</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>Image Caption Generator</h1>
        <p class="subtitle">Upload an image and get a caption for it.</p>

        <form id="select-form" action="/select" method="post" enctype="multipart/form-data">
            <label class="upload-area" for="image-input">
                <span class="upload-text">Choose an image</span>
                <span class="upload-hint">JPG, PNG, WebP &middot; Max 10MB</span>
            </label>
            <input type="file" id="image-input" name="image" accept="image/*" onchange="this.form.submit()">
            <noscript><button type="submit">Preview</button></noscript>
        </form>

        <form id="caption-form" action="/submit" method="post">
            <button type="submit" class="submit">Generate caption</button>
        </form>

        {status}

        <section id="result" class="result"{hidden}>
            {preview}
            {caption}
        </section>
    </div>
</body>
</html>
"#
    )
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            padding: 20px;
        }
        .container {
            background: white;
            border-radius: 20px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            max-width: 800px;
            width: 100%;
            padding: 40px;
        }
        h1 { color: #333; margin-bottom: 10px; font-size: 2em; }
        .subtitle { color: #666; margin-bottom: 30px; font-size: 0.9em; }
        .upload-area {
            display: block;
            border: 3px dashed #667eea;
            border-radius: 15px;
            padding: 40px 20px;
            text-align: center;
            cursor: pointer;
            background: #f8f9ff;
        }
        .upload-area:hover { border-color: #764ba2; background: #f0f2ff; }
        .upload-text { display: block; color: #667eea; font-size: 1.2em; font-weight: 600; margin-bottom: 10px; }
        .upload-hint { color: #999; font-size: 0.9em; }
        input[type="file"] { margin-top: 10px; }
        .submit {
            margin-top: 20px;
            background: #667eea;
            color: white;
            border: none;
            border-radius: 20px;
            padding: 10px 24px;
            font-weight: 600;
            cursor: pointer;
        }
        .status { margin-top: 20px; color: #333; min-height: 1.2em; }
        .status.error { color: #c33; }
        .result { background: #f8f9ff; border-radius: 10px; padding: 20px; margin-top: 20px; }
        .preview-image { max-width: 100%; border-radius: 10px; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
        .caption { margin-top: 20px; }
        .caption-label {
            color: #667eea;
            font-weight: 600;
            margin-bottom: 10px;
            font-size: 0.9em;
            text-transform: uppercase;
            letter-spacing: 1px;
        }
        .caption-text { color: #333; font-size: 1.1em; line-height: 1.6; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SelectedFile;

    #[test]
    fn empty_state_hides_result_panel() {
        let html = render_page(&View::from(&UiState::new()));
        assert!(html.contains(r#"<section id="result" class="result" hidden>"#));
        assert!(!html.contains(r#"id="caption-text""#));
        assert!(!html.contains(r#"id="preview-image""#));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn caption_is_escaped() {
        let mut state = UiState::new();
        state.select_file(Some(SelectedFile::new("a.png", None, vec![1u8])));
        let (ticket, _) = state.begin_submit().unwrap();
        state.finish_submit(ticket, Ok("<b>cats & dogs</b>".into()));

        let html = render_page(&View::from(&state));
        assert!(html.contains("&lt;b&gt;cats &amp; dogs&lt;/b&gt;"));
        assert!(html.contains(r#"<section id="result" class="result">"#));
    }

    #[test]
    fn error_status_gets_error_class() {
        let mut state = UiState::new();
        let _ = state.begin_submit();

        let html = render_page(&View::from(&state));
        assert!(html.contains(r#"class="status error""#));
        assert!(html.contains("Please select an image to upload."));
    }

    #[test]
    fn busy_view_refreshes() {
        let mut state = UiState::new();
        state.select_file(Some(SelectedFile::new("a.png", None, vec![1u8])));

        let view = View::from(&state);
        assert!(view.busy);
        assert!(render_page(&view).contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn preview_is_linked_not_inlined() {
        let mut state = UiState::new();
        let ticket = state
            .select_file(Some(SelectedFile::new("a.png", None, vec![1u8])))
            .unwrap();
        state.apply_preview(ticket, Ok("data:image/png;base64,AQ==".into()));
        state.begin_submit().unwrap();

        let view = View::from(&state);
        assert!(view.busy);
        let html = render_page(&view);
        assert!(html.contains(r#"src="/preview?v=1""#));
        assert!(!html.contains("base64,"));
    }

    #[test]
    fn view_serializes_phase_in_snake_case() {
        let json = serde_json::to_value(View::from(&UiState::new())).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["result_panel_visible"], false);
    }
}
