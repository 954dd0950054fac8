//! Preview and commit component.

use chrono::Utc;
use enrol_core::{PreviewRow, SchoolApi, UploadSession};
use leptos::*;

use crate::services::GlooApi;

/// Staged rows of the current batch and the commit trigger.
#[component]
pub fn PreviewSection(session: RwSignal<UploadSession>, api: StoredValue<GlooApi>) -> impl IntoView {
    let batch = create_memo(move |_| session.with(|s| s.batch().cloned()));

    let on_commit = move |_| {
        let Some(Ok(pending)) = session.try_update(|s| s.begin_commit(Utc::now())) else {
            return;
        };
        let api = api.get_value();

        spawn_local(async move {
            let result = api.commit_batch(pending.batch_id()).await;
            session.update(|s| match s.finish_commit(pending, result) {
                Ok(done) => log::info!("✅ {} students processed", done.processed),
                Err(e) => log::warn!("Commit did not complete: {}", e),
            });
        });
    };

    move || {
        batch.get().map(|batch| {
            let shown = batch.preview_rows.len() as u64;
            let summary = batch.summary.clone().map(|s| {
                let truncated = (s.total_rows > shown)
                    .then(|| format!("Showing {} of {} rows. ", shown, s.total_rows))
                    .unwrap_or_default();
                format!(
                    "{}📊 {} rows • {} session(s) • {} class(es)",
                    truncated, s.total_rows, s.sessions, s.classes
                )
            });
            let expires = batch
                .expires_at
                .map(|at| format!("Batch expires at {}", at.format("%Y-%m-%d %H:%M UTC")));

            view! {
                <section class="preview-section">
                    <h2>"Preview"</h2>
                    <table class="preview-table">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Admission No"</th>
                                <th>"Session"</th>
                                <th>"Class"</th>
                                <th>"Parent email"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {batch.preview_rows.into_iter().map(preview_row).collect_view()}
                        </tbody>
                    </table>
                    {summary.map(|text| view! { <p class="preview-summary">{text}</p> })}
                    {expires.map(|text| view! { <p class="preview-expiry">{text}</p> })}
                    <button
                        class="btn btn-primary"
                        on:click=on_commit
                        disabled=move || !session.with(UploadSession::can_commit)
                    >
                        {move || {
                            if session.with(UploadSession::is_committing) {
                                "⏳ Committing..."
                            } else {
                                "✅ Commit students"
                            }
                        }}
                    </button>
                </section>
            }
        })
    }
}

fn preview_row(row: PreviewRow) -> impl IntoView {
    let placement = row.placement();
    view! {
        <tr>
            <td>{row.name.unwrap_or_default()}</td>
            <td>{row.admission_no.unwrap_or_default()}</td>
            <td>{row.session.unwrap_or_default()}</td>
            <td>{placement}</td>
            <td>{row.parent_email.unwrap_or_default()}</td>
        </tr>
    }
}
