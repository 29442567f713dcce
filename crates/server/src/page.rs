use std::fmt::Write;

use directory::MAX_GROUP_NAME_LENGTH;

use crate::flash::FlashMessage;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Create Security Group</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }
.flash { padding: .75rem 1rem; border-radius: .25rem; margin-bottom: 1rem; }
.flash-success { background: #e6f4ea; color: #1e4620; }
.flash-warning { background: #fff4e5; color: #663c00; }
.flash-error { background: #fdecea; color: #611a15; }
label { display: block; margin-bottom: .5rem; }
input[type=text] { width: 100%; padding: .5rem; box-sizing: border-box; }
button { margin-top: 1rem; padding: .5rem 1.5rem; }
</style>
</head>
<body>
<h1>Create Security Group</h1>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// The submission form with any pending flash messages above it.
pub(crate) fn render(messages: &[FlashMessage]) -> String {
    let mut html = String::from(HEAD);

    for flash in messages {
        let _ = writeln!(
            html,
            r#"<div class="flash flash-{}" role="alert">{}</div>"#,
            flash.category.as_str(),
            escape(&flash.message)
        );
    }

    let _ = write!(
        html,
        r#"<form method="post" action="/create_group">
<label for="group_name">Group name</label>
<input type="text" id="group_name" name="group_name" maxlength="{MAX_GROUP_NAME_LENGTH}" required autofocus>
<button type="submit">Create group</button>
</form>
"#
    );

    html.push_str(TAIL);
    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    escaped
}
