use crate::config::InteractionMode;
use crate::models::{FIXED_CAPTION, TrackerView};
use crate::slot::{Category, Slot};
use chrono::NaiveDate;
use std::fmt::Write;

pub fn render_index(view: &TrackerView) -> String {
    INDEX_HTML
        .replace("{{MODE}}", mode_name(view.mode))
        .replace("{{HEADER}}", &render_header(view))
        .replace("{{GRID}}", &render_grid(view))
        .replace("{{TOTAL}}", &view.stats.total.to_string())
        .replace("{{CAPACITY}}", &view.stats.capacity.to_string())
        .replace("{{PINK}}", &view.stats.pink.to_string())
        .replace("{{BLUE}}", &view.stats.blue.to_string())
        .replace("{{HINT}}", hint(view.mode))
        .replace("{{MODALS}}", &render_modals(view))
}

/// Short numeric label for an ISO date; anything else is shown as typed.
pub fn date_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%-m/%-d/%y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            _ => out.push(ch),
        }
    }
    out
}

fn mode_name(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Editor => "editor",
        InteractionMode::Cycle => "cycle",
    }
}

fn hint(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Editor => {
            "Click the footprints on the board to record a delivery date and choose a color."
        }
        InteractionMode::Cycle => "Tap a footprint to switch it between empty, pink and blue.",
    }
}

fn render_header(view: &TrackerView) -> String {
    let state = &view.state;
    let mut out = format!(
        r#"<input class="name engraved" data-field="name" type="text" value="{}" aria-label="Name" />"#,
        escape_html(&state.name)
    );

    match view.mode {
        InteractionMode::Editor => {
            let _ = write!(
                out,
                r#"<div class="caption engraved">{}</div><div class="period engraved">{}<span>-</span>{}</div>"#,
                FIXED_CAPTION,
                year_select("start_year", "Start year", &state.start_year, &view.year_choices),
                year_select("end_year", "End year", &state.end_year, &view.year_choices),
            );
        }
        InteractionMode::Cycle => {
            let _ = write!(
                out,
                r#"<input class="caption engraved" data-field="subtitle" type="text" value="{}" aria-label="Subtitle" /><input class="period engraved" data-field="date_range" type="text" value="{}" aria-label="Date range" />"#,
                escape_html(&state.subtitle),
                escape_html(&state.date_range),
            );
        }
    }
    out
}

fn year_select(field: &str, label: &str, current: &str, choices: &[String]) -> String {
    let mut out = format!(r#"<select data-field="{field}" aria-label="{label}">"#);
    if !choices.iter().any(|year| year == current) {
        let _ = write!(
            out,
            r#"<option value="{0}" selected>{0}</option>"#,
            escape_html(current)
        );
    }
    for year in choices {
        let selected = if year == current { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{year}"{selected}>{year}</option>"#);
    }
    out.push_str("</select>");
    out
}

fn render_grid(view: &TrackerView) -> String {
    let mut out = String::new();
    for (index, slot) in view.state.slots.iter().enumerate() {
        let number = index + 1;
        let title = if slot.date.is_empty() {
            format!("Slot {number}")
        } else {
            format!("Delivered: {}", escape_html(&slot.date))
        };
        let label = if slot.date.is_empty() {
            String::new()
        } else {
            format!(r#"<span class="date">{}</span>"#, escape_html(&date_label(&slot.date)))
        };
        let _ = write!(
            out,
            r#"<button class="slot" data-action='{{"type":"select_slot","index":{index}}}' aria-label="Slot {number}, currently {color}" title="{title}"><div class="print">{svg}</div><div class="date-row">{label}</div></button>"#,
            color = slot.color.as_str(),
            svg = footprint_svg(slot),
        );
    }
    out
}

fn render_modals(view: &TrackerView) -> String {
    let mut out = String::new();

    if let Some(index) = view.active_slot {
        if let Some(slot) = view.state.slots.get(index) {
            let pressed = |category: Category| {
                if slot.color == category { " chosen" } else { "" }
            };
            let _ = write!(
                out,
                r#"<div class="overlay" data-action='{{"type":"close_editor"}}'><div class="modal" data-stop>
<h3>Record Delivery {number}</h3>
<label for="delivery-date">Delivery Date</label>
<input id="delivery-date" type="date" value="{date}" />
<label>Footprint Color</label>
<div class="choices">
<button class="choice pink{pink}" data-action='{{"type":"choose_category","category":"pink"}}'>Girl (Pink)</button>
<button class="choice blue{blue}" data-action='{{"type":"choose_category","category":"blue"}}'>Boy (Blue)</button>
</div>
<button class="choice clear{empty}" data-action='{{"type":"clear_slot"}}'>Clear Slot</button>
<button class="done" data-action='{{"type":"close_editor"}}'>Done</button>
</div></div>"#,
                number = index + 1,
                date = escape_html(&slot.date),
                pink = pressed(Category::Pink),
                blue = pressed(Category::Blue),
                empty = pressed(Category::Empty),
            );
        }
    }

    if view.reset_pending {
        out.push_str(
            r#"<div class="overlay" data-action='{"type":"cancel_reset"}'><div class="modal" data-stop>
<h3>Reset Board</h3>
<p>Are you sure you want to reset all counters? This action cannot be undone.</p>
<div class="modal-actions">
<button class="cancel" data-action='{"type":"cancel_reset"}'>Cancel</button>
<button class="danger" data-action='{"type":"confirm_reset"}'>Reset</button>
</div>
</div></div>"#,
        );
    }

    out
}

fn footprint_svg(slot: &Slot) -> String {
    let (fill, stroke, class) = match slot.color {
        Category::Empty => ("rgba(80, 50, 20, 0.15)", "rgba(0,0,0,0.1)", "empty"),
        Category::Pink => ("#ff9eb5", "rgba(0,0,0,0.05)", "filled"),
        Category::Blue => ("#7cd0ff", "rgba(0,0,0,0.05)", "filled"),
    };
    let highlight = if slot.is_empty() {
        ""
    } else {
        r#"<path d="M 32 40 C 20 50, 25 85, 45 92" fill="none" stroke="rgba(255,255,255,0.5)" stroke-width="2" stroke-linecap="round"/><ellipse cx="30" cy="18" rx="3" ry="5" fill="rgba(255,255,255,0.4)" transform="rotate(-15 30 18)"/>"#
    };

    format!(
        r#"<svg viewBox="0 0 100 100" class="{class}"><g fill="{fill}" stroke="{stroke}" stroke-width="1"><ellipse cx="32" cy="22" rx="10" ry="14" transform="rotate(-15 32 22)"/><ellipse cx="54" cy="18" rx="7" ry="10" transform="rotate(-5 54 18)"/><ellipse cx="70" cy="22" rx="6" ry="8" transform="rotate(5 70 22)"/><ellipse cx="82" cy="30" rx="5" ry="7" transform="rotate(15 82 30)"/><path d="M 32 40 C 20 50, 25 85, 45 92 C 65 99, 82 85, 80 60 C 78 40, 60 32, 45 35 C 38 36, 35 38, 32 40 Z"/>{highlight}</g></svg>"#
    )
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Delivery Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Great+Vibes&family=Playfair+Display:wght@600&display=swap');

    :root {
      --wood-1: #d8b88f;
      --wood-2: #c49a6c;
      --ink: #44362a;
      --pink: #ec4899;
      --blue: #3b82f6;
      --card: #ffffff;
      --shadow: 0 24px 60px rgba(60, 40, 20, 0.22);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: #f5efe6;
      color: var(--ink);
      font-family: "Playfair Display", Georgia, serif;
      display: flex;
      flex-wrap: wrap;
      gap: 40px;
      justify-content: center;
      align-items: flex-start;
      padding: 48px 16px;
    }

    .board {
      width: min(680px, 100%);
      padding: 40px 32px;
      border-radius: 32px;
      background: repeating-linear-gradient(90deg, var(--wood-1) 0 18px, var(--wood-2) 18px 20px);
      box-shadow: var(--shadow);
    }

    .engraved {
      text-align: center;
      color: var(--ink);
      text-shadow: 1px 1px 0 rgba(255, 255, 255, 0.4);
    }

    header {
      display: grid;
      gap: 6px;
      margin-bottom: 28px;
    }

    header input,
    header select {
      background: transparent;
      border: none;
      outline: none;
      font: inherit;
      color: inherit;
      text-align: center;
      width: 100%;
    }

    .name {
      font-family: "Great Vibes", cursive;
      font-size: clamp(2.2rem, 6vw, 3.6rem);
    }

    .caption {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .period {
      display: flex;
      justify-content: center;
      gap: 8px;
      font-size: 1.3rem;
      letter-spacing: 0.12em;
    }

    .period select {
      width: auto;
      cursor: pointer;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(8, 1fr);
      gap: 24px 10px;
    }

    .slot {
      background: none;
      border: none;
      padding: 0;
      cursor: pointer;
      transition: transform 150ms ease;
    }

    .slot:hover {
      transform: scale(1.1);
    }

    .print svg {
      width: 100%;
      height: auto;
    }

    .print svg.filled {
      transform: scale(1.05) rotate(-5deg);
      filter: drop-shadow(2px 4px 3px rgba(0, 0, 0, 0.4));
    }

    .print svg.empty {
      transform: scale(0.95) rotate(-5deg);
    }

    .date-row {
      height: 16px;
      font-family: monospace;
      font-size: 10px;
    }

    .panel {
      width: min(360px, 100%);
      background: var(--card);
      border-radius: 24px;
      padding: 32px;
      box-shadow: var(--shadow);
      display: grid;
      gap: 24px;
      font-family: system-ui, sans-serif;
    }

    .total {
      display: flex;
      justify-content: space-between;
      align-items: flex-end;
      font-size: 2.2rem;
      font-weight: 700;
    }

    .total small {
      font-size: 1rem;
      font-weight: 500;
      color: #8b857d;
    }

    .split {
      display: flex;
      gap: 16px;
    }

    .split div {
      flex: 1;
      border-radius: 16px;
      padding: 16px;
      text-align: center;
      font-size: 1.8rem;
      font-weight: 700;
    }

    .split span {
      display: block;
      font-size: 0.8rem;
      letter-spacing: 0.1em;
      text-transform: uppercase;
    }

    .girls {
      background: #fdf2f8;
      color: var(--pink);
    }

    .boys {
      background: #eff6ff;
      color: var(--blue);
    }

    button.reset,
    .modal button {
      width: 100%;
      padding: 12px;
      border-radius: 12px;
      border: 1px solid #e7e5e4;
      background: white;
      font: inherit;
      cursor: pointer;
    }

    .overlay {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.4);
      display: grid;
      place-items: center;
      padding: 16px;
      font-family: system-ui, sans-serif;
    }

    .modal {
      background: white;
      border-radius: 18px;
      padding: 24px;
      width: min(380px, 100%);
      display: grid;
      gap: 12px;
    }

    .choices,
    .modal-actions {
      display: flex;
      gap: 12px;
    }

    .choice.pink.chosen {
      background: #fdf2f8;
      border-color: var(--pink);
    }

    .choice.blue.chosen {
      background: #eff6ff;
      border-color: var(--blue);
    }

    .choice.clear.chosen {
      background: #f5f5f4;
    }

    .done {
      background: #292524 !important;
      color: white;
    }

    .danger {
      background: #ef4444 !important;
      color: white;
    }
  </style>
</head>
<body data-mode="{{MODE}}">
  <section class="board">
    <header>{{HEADER}}</header>
    <div class="grid">{{GRID}}</div>
  </section>

  <aside class="panel">
    <div>
      <h2>Delivery Progress</h2>
      <p>{{HINT}}</p>
    </div>
    <div class="total">
      <span><small>Total Deliveries</small></span>
      <span id="total">{{TOTAL}} <small>/ {{CAPACITY}}</small></span>
    </div>
    <div class="split">
      <div class="girls"><span>Girls</span><b id="pink">{{PINK}}</b></div>
      <div class="boys"><span>Boys</span><b id="blue">{{BLUE}}</b></div>
    </div>
    <button class="reset" data-action='{"type":"request_reset"}'>Reset Board</button>
  </aside>

  {{MODALS}}

  <script>
    async function send(action) {
      const res = await fetch('/api/action', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(action),
      });
      if (!res.ok) {
        console.error('action failed', await res.text());
      }
      return res;
    }

    document.addEventListener('click', async (event) => {
      const target = event.target.closest('[data-action], [data-stop]');
      if (!target || !target.dataset.action) {
        return;
      }
      await send(JSON.parse(target.dataset.action));
      window.location.reload();
    });

    document.querySelectorAll('[data-field]').forEach((input) => {
      const kind = input.tagName === 'SELECT' ? 'change' : 'input';
      input.addEventListener(kind, () => {
        send({ type: 'edit_header', field: input.dataset.field, value: input.value });
      });
    });

    const dateInput = document.getElementById('delivery-date');
    if (dateInput) {
      dateInput.addEventListener('change', async () => {
        await send({ type: 'edit_date', date: dateInput.value });
        window.location.reload();
      });
    }

    document.querySelectorAll('.slot .date').forEach((label) => {
      const iso = label.closest('.slot').title.replace('Delivered: ', '');
      if (!/^\d{4}-\d{2}-\d{2}$/.test(iso)) {
        return;
      }
      const parsed = new Date(`${iso}T00:00`);
      if (!Number.isNaN(parsed.getTime())) {
        label.textContent = parsed.toLocaleDateString(undefined, {
          year: '2-digit',
          month: 'numeric',
          day: 'numeric',
        });
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Tracker, policy_for};
    use crate::storage::{KvStore, Persistence, tests::unique_data_path};

    async fn view_for(mode: InteractionMode, actions: Vec<Action>) -> TrackerView {
        let path = unique_data_path("ui");
        let mut tracker =
            Tracker::open(Persistence::new(KvStore::new(&path)), policy_for(mode)).await;
        for action in actions {
            tracker.apply(action).await.unwrap();
        }
        let _ = std::fs::remove_file(path);
        tracker.view()
    }

    #[test]
    fn date_label_shortens_iso_dates() {
        assert_eq!(date_label("2024-05-01"), "5/1/24");
        assert_eq!(date_label("last spring"), "last spring");
    }

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(escape_html(r#"<b>"A&B'"#), "&lt;b&gt;&quot;A&amp;B&#39;");
    }

    #[tokio::test]
    async fn board_renders_forty_slots_and_counts() {
        let view = view_for(
            InteractionMode::Editor,
            vec![
                Action::SelectSlot { index: 0 },
                Action::ChooseCategory { category: Category::Pink },
                Action::EditDate { date: "2024-05-01".to_string() },
                Action::EditHeader {
                    field: crate::controller::HeaderField::Name,
                    value: "<Eve>".to_string(),
                },
            ],
        )
        .await;
        let html = render_index(&view);

        assert_eq!(html.matches(r#"class="slot""#).count(), 40);
        assert!(html.contains("Slot 1, currently pink"));
        assert!(html.contains("Delivered: 2024-05-01"));
        assert!(html.contains("Record Delivery 1"));
        assert!(html.contains("&lt;Eve&gt;"));
        assert!(html.contains(FIXED_CAPTION));
        assert!(html.contains(r#"aria-label="Start year""#));
        assert!(html.contains(r#"aria-label="End year""#));
        assert!(!html.contains(r#"aria-label="start_year""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn client_relabel_reads_dates_as_local_days() {
        assert!(INDEX_HTML.contains("new Date(`${iso}T00:00`)"));
        assert!(!INDEX_HTML.contains("new Date(iso)"));
    }

    #[tokio::test]
    async fn cycle_mode_renders_free_text_header() {
        let view = view_for(InteractionMode::Cycle, vec![Action::RequestReset]).await;
        let html = render_index(&view);

        assert!(html.contains(r#"data-field="date_range""#));
        assert!(!html.contains("<select"));
        assert!(html.contains("Are you sure you want to reset"));
    }
}
