use crate::models::{ActivityTypeResponse, TodayResponse, format_quantity};
use crate::navigation::Screen;
use crate::validation::ValidationError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything the page shell needs at first paint.
pub struct IndexPage<'a> {
    pub today: &'a TodayResponse,
    pub types: &'a [ActivityTypeResponse],
    pub screen: Screen,
    /// Pre-filled error banner when the first load failed.
    pub banner: Option<&'a str>,
}

pub fn render_index(page: &IndexPage<'_>) -> String {
    let today = page.today;
    let messages: BTreeMap<&str, String> = [
        ValidationError::MissingValue,
        ValidationError::NotANumber,
        ValidationError::NonPositive,
    ]
    .into_iter()
    .map(|err| (err.code(), err.to_string()))
    .collect();
    let banner = page.banner.unwrap_or_default();

    INDEX_HTML
        .replace("{{BANNER_CLASS}}", if banner.is_empty() { "" } else { " visible" })
        .replace("{{BANNER}}", &escape_html(banner))
        .replace("{{SCREEN}}", page.screen.as_str())
        .replace("{{MESSAGES_JSON}}", &script_json(&messages))
        .replace("{{DATE}}", &escape_html(&today.date_label))
        .replace("{{WATER}}", &format_quantity(today.stats.water))
        .replace("{{STEPS}}", &format_quantity(today.stats.steps))
        .replace("{{SLEEP}}", &format_quantity(today.stats.sleep))
        .replace("{{TYPES_JSON}}", &script_json(&page.types))
}

/// JSON safe to inline in a `<script>` block.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Health Tracker</title>
  <style>
    :root {
      --bg: #f3f6fa;
      --ink: #1f2933;
      --muted: #627084;
      --accent: #2563eb;
      --water: #2563eb;
      --steps: #16a34a;
      --sleep: #7c3aed;
      --card: #ffffff;
      --danger: #dc2626;
      --shadow: 0 12px 32px rgba(31, 41, 51, 0.12);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    header {
      background: var(--accent);
      color: #fff;
      padding: 24px;
      box-shadow: var(--shadow);
    }

    header h1 { margin: 0; font-size: 1.6rem; }
    header p { margin: 4px 0 0; opacity: 0.85; }

    main { max-width: 860px; margin: 0 auto; padding: 24px; display: grid; gap: 20px; }

    nav { display: flex; gap: 8px; flex-wrap: wrap; }

    nav button, .primary {
      border: 0;
      border-radius: 10px;
      padding: 10px 16px;
      font: inherit;
      cursor: pointer;
      background: #e2e8f0;
      color: var(--ink);
    }

    nav button.active, .primary { background: var(--accent); color: #fff; }

    .screen { display: none; gap: 16px; }
    .screen.active { display: grid; }

    .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; }

    .card {
      background: var(--card);
      border-radius: 14px;
      padding: 20px;
      box-shadow: var(--shadow);
    }

    .card .value { font-size: 2rem; font-weight: 700; margin: 6px 0 0; }
    .card.water .value { color: var(--water); }
    .card.steps .value { color: var(--steps); }
    .card.sleep .value { color: var(--sleep); }

    .types { display: grid; grid-template-columns: repeat(3, 1fr); gap: 10px; }
    .types button { padding: 14px; border-radius: 10px; border: 2px solid #cbd5e1; background: #fff; font: inherit; cursor: pointer; }
    .types button.selected { border-color: var(--accent); background: #eff6ff; }

    label { font-weight: 600; display: block; margin-bottom: 6px; }
    input, textarea { width: 100%; padding: 10px; border-radius: 10px; border: 2px solid #cbd5e1; font: inherit; }
    input.invalid { border-color: var(--danger); }

    .error { color: var(--danger); min-height: 1.2em; margin: 6px 0 0; }
    .banner { background: #fef2f2; color: var(--danger); padding: 12px 16px; border-radius: 10px; display: none; }
    .banner.visible { display: block; }
    .hint { color: var(--muted); font-size: 0.9rem; margin: 4px 0 0; }

    .group h3 { margin: 0 0 8px; }
    .group h3 small { color: var(--muted); font-weight: 400; }
    .entry { display: flex; justify-content: space-between; padding: 8px 0; border-top: 1px solid #e2e8f0; }
    .entry:first-of-type { border-top: 0; }
    .entry .notes { color: var(--muted); font-size: 0.9rem; }
    .success { text-align: center; }
    .success h2 { color: var(--steps); }
  </style>
</head>
<body>
  <header>
    <h1>Health Tracker</h1>
    <p id="date">{{DATE}}</p>
  </header>

  <main>
    <nav>
      <button data-screen="dashboard">Dashboard</button>
      <button data-screen="log-activity">Log Activity</button>
      <button data-screen="history">History</button>
    </nav>

    <div class="banner{{BANNER_CLASS}}" id="banner">{{BANNER}}</div>

    <section class="screen" data-view="welcome">
      <div class="card">
        <h2>Welcome</h2>
        <p>Track water, steps and sleep, one entry at a time.</p>
        <button class="primary" data-go="dashboard">Get started</button>
      </div>
    </section>

    <section class="screen" data-view="dashboard">
      <h2>Today's Summary</h2>
      <div class="cards">
        <div class="card water"><div>Water</div><p class="value" id="stat-water">{{WATER}}</p><p class="hint">glasses</p></div>
        <div class="card steps"><div>Steps</div><p class="value" id="stat-steps">{{STEPS}}</p><p class="hint">steps</p></div>
        <div class="card sleep"><div>Sleep</div><p class="value" id="stat-sleep">{{SLEEP}}</p><p class="hint">hours</p></div>
      </div>
      <button class="primary" id="refresh">Refresh</button>
    </section>

    <section class="screen" data-view="log-activity">
      <form class="card" id="log-form" novalidate>
        <label>Activity Type</label>
        <div class="types" id="types"></div>
        <div style="margin-top: 16px">
          <label for="value" id="value-label">Value</label>
          <input id="value" autocomplete="off" />
          <p class="hint" id="limit"></p>
          <p class="error" id="value-error"></p>
        </div>
        <div>
          <label for="notes">Notes (optional)</label>
          <textarea id="notes" rows="3"></textarea>
        </div>
        <button class="primary" type="submit" id="submit" style="margin-top: 12px">Log Activity</button>
      </form>
      <div class="card success" id="logged" hidden>
        <h2>Activity Logged!</h2>
        <p>Redirecting to dashboard...</p>
      </div>
    </section>

    <section class="screen" data-view="history">
      <h2>Last 7 Days</h2>
      <button class="primary" id="history-refresh">Refresh</button>
      <div id="history"></div>
    </section>
  </main>

  <script>
    const TYPES = {{TYPES_JSON}};
    const MESSAGES = {{MESSAGES_JSON}};
    const byType = Object.fromEntries(TYPES.map((t) => [t.activity_type, t]));

    // Results are applied only if no navigation happened since the request.
    let screen = '{{SCREEN}}';
    let generation = 0;
    const token = () => ({ screen, generation });
    const current = (t) => t.screen === screen && t.generation === generation;

    const banner = document.getElementById('banner');
    const showBanner = (message) => {
      banner.textContent = message;
      banner.classList.toggle('visible', Boolean(message));
    };

    const fmt = (n) => Number.isInteger(n) ? n.toLocaleString('en-US') : String(n);

    const show = (next) => {
      document.querySelectorAll('.screen').forEach((el) => el.classList.toggle('active', el.dataset.view === next));
      document.querySelectorAll('nav button').forEach((el) => el.classList.toggle('active', el.dataset.screen === next));
      document.getElementById('log-form').hidden = false;
      document.getElementById('logged').hidden = true;
    };

    const navigateTo = (next) => {
      screen = next;
      generation += 1;
      showBanner('');
      show(next);
      if (next === 'dashboard') loadToday();
      if (next === 'history') loadHistory();
    };

    const fetchJson = async (url, options) => {
      const res = await fetch(url, options);
      const body = res.headers.get('content-type')?.includes('json') ? await res.json() : await res.text();
      if (!res.ok) {
        const err = new Error(typeof body === 'string' ? body : body.message);
        err.status = res.status;
        throw err;
      }
      return body;
    };

    const loadToday = async () => {
      const t = token();
      try {
        const today = await fetchJson('/api/today');
        if (!current(t)) return;
        document.getElementById('date').textContent = today.date_label;
        document.getElementById('stat-water').textContent = fmt(today.stats.water);
        document.getElementById('stat-steps').textContent = fmt(today.stats.steps);
        document.getElementById('stat-sleep').textContent = fmt(today.stats.sleep);
      } catch (err) {
        if (current(t)) showBanner(err.message || 'Failed to load stats');
      }
    };

    const loadHistory = async () => {
      const t = token();
      const container = document.getElementById('history');
      try {
        const { groups } = await fetchJson('/api/history');
        if (!current(t)) return;
        container.replaceChildren();
        if (groups.length === 0) {
          container.textContent = 'No activities logged in the last 7 days.';
          return;
        }
        for (const group of groups) {
          const card = document.createElement('div');
          card.className = 'card group';
          const heading = document.createElement('h3');
          heading.textContent = group.heading + ' ';
          const count = document.createElement('small');
          count.textContent = '(' + group.count_label + ')';
          heading.append(count);
          card.append(heading);
          for (const entry of group.activities) {
            const row = document.createElement('div');
            row.className = 'entry';
            const left = document.createElement('div');
            const info = byType[entry.activity_type];
            left.textContent = info.label + ': ' + fmt(entry.value) + ' ' + info.unit;
            if (entry.notes) {
              const notes = document.createElement('div');
              notes.className = 'notes';
              notes.textContent = entry.notes;
              left.append(notes);
            }
            const time = document.createElement('div');
            time.className = 'hint';
            time.textContent = entry.time_label;
            row.append(left, time);
            card.append(row);
          }
          container.append(card);
        }
      } catch (err) {
        if (current(t)) showBanner(err.message || 'Failed to load activities');
      }
    };

    let selected = 'water';
    const valueInput = document.getElementById('value');
    const valueError = document.getElementById('value-error');

    const setError = (message) => {
      valueError.textContent = message || '';
      valueInput.classList.toggle('invalid', Boolean(message));
    };

    const selectType = (type) => {
      if (type !== selected) {
        valueInput.value = '';
        setError('');
      }
      selected = type;
      const info = byType[type];
      document.querySelectorAll('#types button').forEach((el) => el.classList.toggle('selected', el.dataset.type === type));
      document.getElementById('value-label').textContent = info.label + ' (' + info.unit + ')';
      document.getElementById('limit').textContent = info.limit_label;
      valueInput.placeholder = info.placeholder;
    };

    const typesEl = document.getElementById('types');
    for (const info of TYPES) {
      const button = document.createElement('button');
      button.type = 'button';
      button.dataset.type = info.activity_type;
      button.textContent = info.label;
      button.addEventListener('click', () => selectType(info.activity_type));
      typesEl.append(button);
    }
    selectType('water');

    // Same rules and order as the server: required, numeric, positive, bounded.
    const NUMBER = /^[+-]?(\d+\.?\d*|\.\d+)(e[+-]?\d+)?$|^[+-]?inf(inity)?$/i;
    const validateValue = (raw) => {
      const trimmed = raw.trim();
      if (!trimmed) return MESSAGES.missing_value;
      if (!NUMBER.test(trimmed)) return MESSAGES.not_a_number;
      const value = Number(trimmed.replace(/inf(inity)?$/i, 'Infinity'));
      if (value <= 0) return MESSAGES.non_positive;
      const info = byType[selected];
      if (value > info.max) return info.limit_message;
      return '';
    };

    valueInput.addEventListener('input', () => setError(validateValue(valueInput.value)));

    document.getElementById('log-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const t = token();
      const submit = document.getElementById('submit');
      submit.disabled = true;
      try {
        await fetchJson('/api/activities', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            activity_type: selected,
            value: valueInput.value,
            notes: document.getElementById('notes').value,
          }),
        });
        if (!current(t)) return;
        valueInput.value = '';
        document.getElementById('notes').value = '';
        setError('');
        document.getElementById('log-form').hidden = true;
        document.getElementById('logged').hidden = false;
        setTimeout(() => {
          if (current(t)) navigateTo('dashboard');
        }, 1500);
      } catch (err) {
        if (!current(t)) return;
        setError(err.status === 422 ? err.message : 'Failed to log activity. Please try again.');
      } finally {
        submit.disabled = false;
      }
    });

    document.querySelectorAll('nav button').forEach((el) => el.addEventListener('click', () => navigateTo(el.dataset.screen)));
    document.querySelectorAll('[data-go]').forEach((el) => el.addEventListener('click', () => navigateTo(el.dataset.go)));
    document.getElementById('refresh').addEventListener('click', loadToday);
    document.getElementById('history-refresh').addEventListener('click', loadHistory);

    show(screen);
    if (screen === 'history') loadHistory();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyStats;
    use chrono::NaiveDate;

    #[test]
    fn renders_stats_and_date() {
        let today = TodayResponse {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            date_label: "Tuesday, March 10, 2026".to_string(),
            stats: DailyStats {
                water: 5.0,
                steps: 12_500.0,
                sleep: 7.5,
            },
        };
        let html = render_index(&page(&today, Screen::Welcome, None));
        assert!(html.contains("Tuesday, March 10, 2026"));
        assert!(html.contains(r#"id="stat-water">5<"#));
        assert!(html.contains(r#"id="stat-steps">12,500<"#));
        assert!(html.contains(r#"id="stat-sleep">7.5<"#));
        assert!(html.contains("const TYPES = [];"));
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<div class="banner" id="banner"></div>"#));
        assert!(html.contains("let screen = 'welcome';"));
    }

    fn page<'a>(today: &'a TodayResponse, screen: Screen, banner: Option<&'a str>) -> IndexPage<'a> {
        IndexPage {
            today,
            types: &[],
            screen,
            banner,
        }
    }

    fn empty_today() -> TodayResponse {
        TodayResponse {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            date_label: "Tuesday, March 10, 2026".to_string(),
            stats: DailyStats::default(),
        }
    }

    #[test]
    fn renders_prefilled_banner() {
        let today = empty_today();
        let html = render_index(&page(&today, Screen::Dashboard, Some("Failed to load stats")));
        assert!(html.contains(r#"<div class="banner visible" id="banner">Failed to load stats</div>"#));
        assert!(html.contains(r#"id="stat-water">0<"#));
        assert!(html.contains("let screen = 'dashboard';"));
    }

    #[test]
    fn embeds_validation_messages() {
        let today = empty_today();
        let html = render_index(&page(&today, Screen::LogActivity, None));
        assert!(html.contains(r#""missing_value":"Value is required""#));
        assert!(html.contains(r#""not_a_number":"Value must be a number""#));
        assert!(html.contains(r#""non_positive":"Value must be greater than 0""#));
        assert!(html.contains("setError(validateValue(valueInput.value))"));
    }

    #[test]
    fn includes_confirmation_and_history_refresh() {
        let today = empty_today();
        let html = render_index(&page(&today, Screen::History, None));
        assert!(html.contains("Activity Logged!"));
        assert!(html.contains(r#"id="history-refresh""#));
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_html("<b>&\""), "&lt;b&gt;&amp;&quot;");
    }
}
