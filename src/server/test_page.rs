//! Test page - an HTML form for trying the processing endpoint from a browser.

use crate::pipeline::{DOWNLOAD_FILENAME, EXTRACTED_PAGE, UPLOAD_FIELD};

/// Generate the test page.
///
/// The page asks for the API key, posts the chosen file to `/process-pdf`
/// and offers the result as a download.
pub fn render_test_page(max_upload_size: u64) -> String {
    let max_mb = max_upload_size / (1024 * 1024);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PDF Page Extractor - Test</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 640px;
            margin: 48px auto;
            padding: 0 16px;
            color: #222;
        }}
        label {{
            display: block;
            margin-top: 16px;
            font-weight: 600;
        }}
        input {{
            margin-top: 6px;
            width: 100%;
        }}
        button {{
            margin-top: 24px;
            padding: 8px 20px;
        }}
        #status {{
            margin-top: 24px;
            white-space: pre-wrap;
            font-family: monospace;
        }}
        .error {{ color: #b00020; }}
        .ok {{ color: #1b5e20; }}
    </style>
</head>
<body>
    <h1>PDF Page Extractor</h1>
    <p>Upload a PDF (max {max_mb} MB). Page {page} is returned as <code>{download}</code>.</p>

    <form id="upload-form">
        <label for="api-key">API key</label>
        <input type="password" id="api-key" required>

        <label for="pdf">PDF file</label>
        <input type="file" id="pdf" name="{field}" accept="application/pdf" required>

        <button type="submit">Extract page {page}</button>
    </form>

    <div id="status"></div>

    <script>
        const form = document.getElementById('upload-form');
        const status = document.getElementById('status');

        form.addEventListener('submit', async (event) => {{
            event.preventDefault();
            status.className = '';
            status.textContent = 'Processing...';

            const data = new FormData();
            data.append('{field}', document.getElementById('pdf').files[0]);

            try {{
                const response = await fetch('/process-pdf', {{
                    method: 'POST',
                    headers: {{ 'Authorization': 'Bearer ' + document.getElementById('api-key').value }},
                    body: data,
                }});

                if (!response.ok) {{
                    const body = await response.json().catch(() => ({{ error: response.statusText }}));
                    status.className = 'error';
                    status.textContent = response.status + ': ' + body.error
                        + (body.details ? '\n' + body.details : '');
                    return;
                }}

                const blob = await response.blob();
                const link = document.createElement('a');
                link.href = URL.createObjectURL(blob);
                link.download = '{download}';
                link.click();
                URL.revokeObjectURL(link.href);

                status.className = 'ok';
                status.textContent = 'Done: ' + blob.size + ' bytes';
            }} catch (err) {{
                status.className = 'error';
                status.textContent = 'Request failed: ' + err;
            }}
        }});
    </script>
</body>
</html>
"##,
        max_mb = max_mb,
        page = EXTRACTED_PAGE,
        download = DOWNLOAD_FILENAME,
        field = UPLOAD_FIELD,
    )
}
