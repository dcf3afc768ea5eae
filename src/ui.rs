use crate::chat::ChatMessage;
use crate::checkin::{CheckinDraft, QUICK_PICKS};
use crate::models::{Cause, FrequencyUnit, Goal, Milestone};
use crate::notify::{Toast, Variant};
use crate::onboarding::{Step, Wizard};
use crate::progress::{CauseProgress, GoalProgress};
use std::fmt::Write;

pub fn render_register(error: Option<&str>, toasts: &[Toast]) -> String {
    let body = format!(
        r#"<section class="card auth">
  <h1>Join Ripple Goal</h1>
  <p class="subtitle">Where your growth creates collective good</p>
  {error}
  <form method="post" action="/register">
    <label>Full Name<input type="text" name="name" placeholder="Alex Johnson" required /></label>
    <label>Email<input type="email" name="email" required /></label>
    <label>Password<input type="password" name="password" required /></label>
    <label>Confirm Password<input type="password" name="confirm_password" required /></label>
    <button class="primary" type="submit">Create Account</button>
  </form>
  <p class="switch">Already have an account? <a href="/login">Sign in</a></p>
</section>"#,
        error = form_error(error),
    );
    page("Join Ripple Goal", &body, toasts)
}

pub fn render_login(error: Option<&str>, toasts: &[Toast]) -> String {
    let body = format!(
        r#"<section class="card auth">
  <h1>Welcome back</h1>
  <p class="subtitle">Pick up where your ripple left off</p>
  {error}
  <form method="post" action="/login">
    <label>Email<input type="email" name="email" /></label>
    <label>Password<input type="password" name="password" /></label>
    <button class="primary" type="submit">Sign In</button>
  </form>
  <p class="switch">New here? <a href="/">Create an account</a></p>
</section>"#,
        error = form_error(error),
    );
    page("Sign in", &body, toasts)
}

pub fn render_onboarding(wizard: &Wizard, causes: &[Cause], toasts: &[Toast]) -> String {
    let mut indicator = String::new();
    for step in Step::ALL {
        let class = if step == wizard.step {
            "dot current"
        } else if step.number() <= wizard.step.number() {
            "dot done"
        } else {
            "dot"
        };
        let _ = write!(
            indicator,
            r#"<li class="{class}"><span>{}</span>{}</li>"#,
            step.number(),
            step.label()
        );
    }

    let content = match wizard.step {
        Step::Welcome => r#"<div class="step-body center">
  <div class="hero">✨</div>
  <h2>Welcome to Ripple Goal</h2>
  <p class="subtitle">Transform your weekly wins into collective change.</p>
</div>"#
            .to_string(),
        Step::Goal => goal_step(wizard),
        Step::Cause => cause_step(wizard, causes),
        Step::Ready => ready_step(wizard, causes),
    };

    let back = if wizard.step == Step::Welcome {
        String::new()
    } else {
        r#"<button class="ghost" type="submit" form="back">Back</button>"#.to_string()
    };
    let next_label = if wizard.step == Step::Ready { "Start My Journey" } else { "Continue" };

    let body = format!(
        r#"<section class="card wizard">
  <ol class="steps">{indicator}</ol>
  <div class="bar"><div class="fill" style="width: {fill:.0}%"></div></div>
  <form id="next" method="post" action="/onboarding/next">{content}</form>
  <form id="back" method="post" action="/onboarding/back"></form>
  <div class="actions">{back}<button class="primary" type="submit" form="next">{next_label}</button></div>
</section>"#,
        fill = wizard.step.completion() * 100.0,
    );
    page("Onboarding", &body, toasts)
}

fn goal_step(wizard: &Wizard) -> String {
    let form = &wizard.form;
    let mut units = String::new();
    for unit in FrequencyUnit::ALL {
        let selected = if unit == form.frequency_unit { " selected" } else { "" };
        let _ = write!(units, r#"<option value="{unit}"{selected}>{}</option>"#, unit.label());
    }

    format!(
        r#"<div class="step-body">
  <h2>Define Your Goal</h2>
  <label>Full Name<input type="text" name="name" value="{name}" placeholder="Alex Johnson" />{name_err}</label>
  <label>Goal Description<input type="text" name="goalTitle" value="{title}" placeholder="e.g. Run, Meditate, Learn Spanish" />{title_err}</label>
  <div class="row">
    <label>Target<input type="number" name="targetFrequency" min="1" max="100" value="{target}" />{target_err}</label>
    <label>Frequency<select name="frequencyUnit">{units}</select></label>
  </div>
</div>"#,
        name = escape(&form.name),
        title = escape(&form.goal_title),
        target = escape(&form.target_frequency),
        name_err = field_error(wizard, "name"),
        title_err = field_error(wizard, "goalTitle"),
        target_err = field_error(wizard, "targetFrequency"),
    )
}

fn cause_step(wizard: &Wizard, causes: &[Cause]) -> String {
    let mut options = String::new();
    for cause in causes {
        let checked = if wizard.form.cause_id == Some(cause.id) { " checked" } else { "" };
        let _ = write!(
            options,
            r#"<label class="cause"><input type="radio" name="causeId" value="{id}"{checked} /><span class="emoji">{emoji}</span><strong>{name}</strong><small>{rate} pts/activity</small></label>"#,
            id = cause.id,
            emoji = escape(&cause.emoji),
            name = escape(&cause.name),
            rate = cause.conversion_rate,
        );
    }
    if causes.is_empty() {
        options.push_str(r#"<p class="subtitle">No causes available right now.</p>"#);
    }

    format!(
        r#"<div class="step-body">
  <h2>Choose Your Cause</h2>
  <p class="subtitle">Your progress will contribute to:</p>
  <div class="causes">{options}</div>
  {err}
</div>"#,
        err = field_error(wizard, "causeId"),
    )
}

fn ready_step(wizard: &Wizard, causes: &[Cause]) -> String {
    let form = &wizard.form;
    let cause = causes
        .iter()
        .find(|cause| Some(cause.id) == form.cause_id)
        .map(|cause| format!("{} {}", escape(&cause.emoji), escape(&cause.name)))
        .unwrap_or_default();

    format!(
        r#"<div class="step-body center">
  <div class="hero">🎉</div>
  <h2>All Set, {name}!</h2>
  <p>Your goal: <strong>{title} {target} {unit}/week</strong></p>
  <p>Supporting: <strong>{cause}</strong></p>
</div>"#,
        name = escape(&form.name),
        title = escape(&form.goal_title),
        target = escape(&form.target_frequency),
        unit = form.frequency_unit,
    )
}

pub fn render_dashboard(
    personal: &[GoalProgress],
    community: &[CauseProgress],
    goals: &[Goal],
    draft: &CheckinDraft,
    toasts: &[Toast],
    chat: Option<&[ChatMessage]>,
    show_popup: bool,
) -> String {
    let mut cards = String::new();
    for progress in personal {
        cards.push_str(&goal_card(progress));
    }
    for progress in community {
        cards.push_str(&cause_card(progress));
    }
    if cards.is_empty() {
        cards.push_str(
            r#"<section class="card center"><p>No goals yet. <a href="/onboarding">Set one up</a>.</p></section>"#,
        );
    }

    let popup = if show_popup {
        r#"<aside class="card popup">
  <p><strong>Hi there! 👋</strong> My name is Goaliath. I will help you set your activities reminders😊</p>
  <form method="post" action="/popup/dismiss"><button class="ghost" type="submit">Got it</button></form>
</aside>"#
    } else {
        ""
    };

    let body = format!(
        r#"<header class="top"><h1>Ripple Goal</h1></header>
<div class="grid">{cards}</div>
{checkin}
{chat}
{popup}"#,
        checkin = checkin_form(goals, draft),
        chat = chat.map(chat_panel).unwrap_or_default(),
    );
    page("Dashboard", &body, toasts)
}

fn goal_card(progress: &GoalProgress) -> String {
    format!(
        r#"<section class="card progress personal">
  <h3>🌟 Your Progress</h3>
  <div class="meta"><span>{title}</span><span>{current} {unit} / {target}</span></div>
  <div class="bar"><div class="fill" style="width: {pct:.1}%"></div></div>
  <div class="badge">{badge}</div>
</section>"#,
        title = escape(&progress.title),
        current = progress.current,
        unit = progress.unit,
        target = progress.target,
        pct = progress.percentage,
        badge = progress.stage.emoji(true),
    )
}

fn cause_card(progress: &CauseProgress) -> String {
    let next_unlock = progress
        .next_unlock
        .as_deref()
        .map(|unlock| {
            format!(
                r#"<p class="unlock"><strong>Next Unlock:</strong> {}</p>"#,
                escape(unlock)
            )
        })
        .unwrap_or_default();

    let mut milestones = String::new();
    for milestone in &progress.completed {
        milestones.push_str(&milestone_row(milestone, true));
    }
    for milestone in &progress.upcoming {
        milestones.push_str(&milestone_row(milestone, false));
    }

    format!(
        r#"<section class="card progress community">
  <h3>{emoji} {name}</h3>
  <div class="meta"><span>Community Progress</span><span>{current} / {target}</span></div>
  <div class="bar"><div class="fill" style="width: {pct:.1}%"></div></div>
  {next_unlock}
  <details><summary>Milestones</summary><ul class="milestones">{milestones}</ul></details>
  <div class="badge">{badge}</div>
</section>"#,
        emoji = escape(&progress.emoji),
        name = escape(&progress.name),
        current = progress.current,
        target = progress.target,
        pct = progress.percentage,
        badge = progress.stage.emoji(false),
    )
}

fn milestone_row(milestone: &Milestone, reached: bool) -> String {
    let (class, mark) = if reached { ("reached", "✅") } else { ("pending", "🔜") };
    format!(
        r#"<li class="{class}"><span>{mark}</span><div><p>{points} points</p><small>{action}</small></div></li>"#,
        points = milestone.target_value,
        action = escape(&milestone.action),
    )
}

fn checkin_form(goals: &[Goal], draft: &CheckinDraft) -> String {
    if goals.is_empty() {
        return String::new();
    }

    let mut options = String::new();
    for goal in goals {
        let selected = if draft.goal_id == Some(goal.id) { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{id}"{selected}>{title} ({target} {unit})</option>"#,
            id = goal.id,
            title = escape(&goal.title),
            target = goal.target_frequency,
            unit = goal.frequency_unit,
        );
    }

    let mut picks = String::new();
    for amount in QUICK_PICKS {
        let _ = write!(
            picks,
            r#"<button class="pick" type="submit" name="pick" value="{amount}">{amount}</button>"#
        );
    }

    format!(
        r#"<section class="card checkin">
  <h3>Log Your Progress</h3>
  <form method="post" action="/checkin">
    <select name="goal_id" required><option value="">Select a goal</option>{options}</select>
    <label>Notes<input type="text" name="notes" value="{notes}" /></label>
    <label>How much progress did you make?</label>
    <div class="stepper">
      <button class="ghost" type="submit" formaction="/checkin/step" formnovalidate name="step" value="dec">-</button>
      <input type="number" name="amount" min="1" max="{max}" value="{amount}" />
      <button class="ghost" type="submit" formaction="/checkin/step" formnovalidate name="step" value="inc">+</button>
    </div>
    <button class="primary" type="submit">Add Progress</button>
    <p class="subtitle">Quick add</p>
    <div class="picks">{picks}</div>
  </form>
</section>"#,
        notes = escape(&draft.notes),
        max = draft.max(),
        amount = draft.amount,
    )
}

fn chat_panel(messages: &[ChatMessage]) -> String {
    let mut lines = String::new();
    for message in messages {
        let class = if message.is_user { "user" } else { "assistant" };
        let _ = write!(lines, r#"<li class="{class}">{}</li>"#, escape(&message.text));
    }

    format!(
        r#"<section class="card chat">
  <h3>🤖 Goaliath</h3>
  <ul class="messages">{lines}</ul>
  <form method="post" action="/chat">
    <input type="text" name="message" placeholder="Type your message..." required />
    <button class="primary" type="submit">Send</button>
  </form>
</section>"#
    )
}

fn field_error(wizard: &Wizard, field: &str) -> String {
    wizard
        .errors
        .get(field)
        .map(|message| format!(r#"<span class="error">{message}</span>"#))
        .unwrap_or_default()
}

fn form_error(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default()
}

fn toast_list(toasts: &[Toast]) -> String {
    let mut out = String::new();
    for toast in toasts {
        let variant = match toast.variant {
            Variant::Error => "error",
            Variant::Success => "success",
        };
        let details = toast
            .details
            .as_deref()
            .map(|details| format!("<small>{}</small>", escape(details)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<div class="toast {variant}" data-id="{id}" data-expires="{expires}"><p>{message}</p>{details}<button type="button" class="close">×</button></div>"#,
            id = toast.id,
            expires = toast.expires_at.timestamp_millis(),
            message = escape(&toast.message),
        );
    }
    out
}

fn page(title: &str, body: &str, toasts: &[Toast]) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{TOASTS}}", &toast_list(toasts))
        .replace("{{BODY}}", body)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Ripple Goal</title>
  <style>
    :root {
      --bg-1: #f0fdfa;
      --bg-2: #fef3c7;
      --ink: #1f2937;
      --teal: #0d9488;
      --amber: #f59e0b;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(15, 118, 110, 0.15);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 20px;
    }

    .center {
      text-align: center;
    }

    .subtitle {
      color: #6b7280;
    }

    label {
      display: grid;
      gap: 6px;
      margin-bottom: 14px;
      font-weight: 600;
    }

    input, select {
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid #d1d5db;
      font: inherit;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-weight: 600;
      cursor: pointer;
    }

    .primary {
      background: var(--teal);
      color: white;
    }

    .ghost {
      background: transparent;
      color: var(--teal);
    }

    .error {
      color: #dc2626;
      font-size: 0.85rem;
    }

    .steps {
      display: flex;
      justify-content: space-between;
      list-style: none;
      padding: 0;
    }

    .dot span {
      display: inline-grid;
      place-items: center;
      width: 28px;
      height: 28px;
      border-radius: 50%;
      background: #e5e7eb;
      margin-right: 6px;
    }

    .dot.done span, .dot.current span {
      background: var(--teal);
      color: white;
    }

    .bar {
      height: 12px;
      background: #e5e7eb;
      border-radius: 999px;
      overflow: hidden;
    }

    .fill {
      height: 100%;
      background: linear-gradient(90deg, #2dd4bf, #10b981);
    }

    .community .fill {
      background: linear-gradient(90deg, #fbbf24, #f97316);
    }

    .meta {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
      margin-bottom: 6px;
    }

    .badge, .hero {
      font-size: 2.5rem;
      text-align: center;
      margin-top: 12px;
    }

    .actions {
      display: flex;
      justify-content: space-between;
      margin-top: 18px;
    }

    .causes {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 12px;
    }

    .cause {
      border: 1px solid #e5e7eb;
      border-radius: 14px;
      padding: 12px;
    }

    .milestones {
      list-style: none;
      padding: 0;
    }

    .milestones li {
      display: flex;
      gap: 10px;
      padding: 8px;
      border-radius: 10px;
    }

    .milestones li.reached {
      background: #fffbeb;
    }

    .picks {
      display: flex;
      gap: 10px;
      margin-bottom: 14px;
    }

    .toasts {
      position: fixed;
      top: 16px;
      right: 16px;
      display: grid;
      gap: 10px;
      z-index: 10;
    }

    .toast {
      min-width: 260px;
      padding: 12px 16px;
      border-radius: 14px;
      color: white;
      position: relative;
    }

    .toast.error {
      background: #dc2626;
    }

    .toast.success {
      background: var(--teal);
    }

    .toast .close {
      position: absolute;
      top: 4px;
      right: 6px;
      background: transparent;
      color: white;
      padding: 4px 8px;
    }

    .stepper {
      display: flex;
      gap: 8px;
      align-items: center;
      margin-bottom: 14px;
    }

    .messages {
      list-style: none;
      padding: 0;
      display: grid;
      gap: 8px;
      max-height: 320px;
      overflow-y: auto;
    }

    .messages li {
      padding: 8px 12px;
      border-radius: 12px;
      background: #f3f4f6;
      max-width: 80%;
    }

    .messages li.user {
      justify-self: end;
      background: var(--teal);
      color: white;
    }

    .popup {
      position: fixed;
      bottom: 24px;
      right: 24px;
      max-width: 320px;
    }
  </style>
</head>
<body>
  <div class="toasts">{{TOASTS}}</div>
  <main>
{{BODY}}
  </main>
  <script>
    document.querySelectorAll('.toast').forEach((toast) => {
      const remove = () => toast.remove();
      const wait = Number(toast.dataset.expires) - Date.now();
      setTimeout(remove, Math.max(wait, 0));
      toast.querySelector('.close').addEventListener('click', async () => {
        remove();
        try {
          await fetch(`/api/toasts/${toast.dataset.id}/dismiss`, { method: 'POST' });
        } catch (err) {
          console.error('failed to dismiss toast', err);
        }
      });
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::FormUpdate;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn onboarding_shows_field_errors() {
        let mut wizard = Wizard::default();
        wizard.advance();
        wizard.apply(FormUpdate {
            goal_title: Some("<script>".to_string()),
            ..FormUpdate::default()
        });
        wizard.advance();

        let html = render_onboarding(&wizard, &[], &[]);
        assert!(html.contains("Define Your Goal"));
        assert!(html.contains("Name is required"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("value=\"<script>\""));
    }

    #[test]
    fn dashboard_without_goals_links_to_onboarding() {
        let html = render_dashboard(&[], &[], &[], &CheckinDraft::default(), &[], None, false);
        assert!(html.contains("/onboarding"));
        assert!(!html.contains("Log Your Progress"));
        assert!(!html.contains(r#"action="/chat""#));
    }

    #[test]
    fn chat_panel_escapes_messages() {
        let messages = vec![
            ChatMessage::assistant("Hi there! 👋"),
            ChatMessage::user("<b>remind me</b>"),
        ];
        let html = render_dashboard(
            &[],
            &[],
            &[],
            &CheckinDraft::default(),
            &[],
            Some(&messages),
            false,
        );
        assert!(html.contains(r#"action="/chat""#));
        assert!(html.contains(r#"<li class="user">&lt;b&gt;remind me&lt;/b&gt;</li>"#));
    }
}
