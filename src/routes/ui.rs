use axum::{response::Html, routing::get, Router};

use crate::models::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Oxidized Summarizer</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; max-width: 960px; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input, select, textarea { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    textarea { min-height: 18rem; font-family: Menlo, monospace; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    .row { display: flex; gap: 1rem; }
    .row > div { flex: 1; }
    #status { margin-top: 0.75rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Oxidized Summarizer</h1>
  <p>Upload a PDF, DOCX or TXT document and get a summary back in the format you need.</p>

  <div class="card">
    <h2>1) Upload document</h2>
    <form id="summarizeForm">
      <input name="file" type="file" accept=".pdf,.docx,.txt" required />
      <div class="row">
        <div>
          <label>Task</label>
          <select name="task">
            <option value="summary">Executive summary</option>
            <option value="detailed">Detailed report</option>
            <option value="study note">Study notes</option>
            <option value="presentation">Presentation outline</option>
          </select>
        </div>
        <div>
          <label>Target words</label>
          <input name="words" type="number" min="50" max="20000" value="800" />
        </div>
        <div>
          <label>Language</label>
          <input name="language" value="English" list="languages" />
          <datalist id="languages">
            <option>English</option><option>Polish</option><option>German</option>
            <option>French</option><option>Spanish</option><option>Italian</option>
            <option>Portuguese</option><option>Dutch</option><option>Ukrainian</option>
          </datalist>
        </div>
        <div>
          <label>Output format</label>
          <select name="format">
            <option value="txt">TXT</option>
            <option value="docx">DOCX</option>
            <option value="pdf">PDF</option>
          </select>
        </div>
      </div>
      <label>Notes for the summarizer (optional)</label>
      <input name="notes" placeholder="Focus on methodology, skip the appendix" />
      <button type="submit">Summarize</button>
    </form>
    <div id="status"></div>
  </div>

  <div class="card">
    <h2>2) Review and download</h2>
    <form id="downloadForm" method="post" action="/api/download">
      <textarea id="summaryText" name="text" placeholder="The summary appears here and can be edited before download."></textarea>
      <div class="row">
        <div>
          <label>Download as</label>
          <select id="downloadFormat" name="format">
            <option value="txt">TXT</option>
            <option value="docx">DOCX</option>
            <option value="pdf">PDF</option>
          </select>
        </div>
      </div>
      <button type="submit">Download</button>
      <button type="button" id="resetBtn">Start over</button>
    </form>
  </div>

  <script>
    const form = document.getElementById('summarizeForm');
    const status = document.getElementById('status');
    const summaryText = document.getElementById('summaryText');
    const downloadFormat = document.getElementById('downloadFormat');

    async function loadLatest() {
      const res = await fetch('/api/summary', { credentials: 'same-origin' });
      if (!res.ok) return;
      const json = await res.json();
      summaryText.value = json.summary;
      downloadFormat.value = json.options.output;
    }

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      status.textContent = 'Extracting and summarizing...';
      const res = await fetch('/api/summarize', {
        method: 'POST',
        body: new FormData(form),
        credentials: 'same-origin'
      });
      const json = await res.json();
      if (!res.ok) {
        status.textContent = `Error (${json.error}): ${json.message}`;
        return;
      }
      const meta = json.metadata;
      status.textContent = `Done: ${meta.page_count} page(s), ${meta.word_count} words read` +
        (meta.truncated ? ' (source truncated)' : '');
      summaryText.value = json.summary;
      downloadFormat.value = json.options.output;
    });

    document.getElementById('resetBtn').addEventListener('click', async () => {
      await fetch('/api/reset', { method: 'POST', credentials: 'same-origin' });
      summaryText.value = '';
      status.textContent = '';
      form.reset();
    });

    loadLatest();
  </script>
</body>
</html>"#)
}
