//! Validation failure component.

use chrono::Utc;
use enrol_core::{Notice, UploadSession};
use leptos::*;

use crate::services::trigger_download;

/// Row-level errors from a rejected upload, with the server's error log.
#[component]
pub fn ErrorsSection(session: RwSignal<UploadSession>) -> impl IntoView {
    let failure = create_memo(move |_| session.with(|s| s.failure().cloned()));

    let on_download = move |_| {
        if let Some(Ok(file)) = session.try_update(|s| s.export_error_log(Utc::now())) {
            if let Err(e) = trigger_download(&file) {
                session.update(|s| s.set_notice(Notice::danger(e.to_string())));
            }
        }
    };

    move || {
        failure.get().map(|failure| {
            let rows = if failure.errors.is_empty() {
                view! { <p class="errors-empty">"No row-level details were returned."</p> }
                    .into_view()
            } else {
                view! {
                    <table class="errors-table">
                        <thead>
                            <tr>
                                <th>"Row"</th>
                                <th>"Column"</th>
                                <th>"Problem"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {failure
                                .errors
                                .into_iter()
                                .map(|e| {
                                    view! {
                                        <tr>
                                            <td>{e.row}</td>
                                            <td>{e.column}</td>
                                            <td>{e.message}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                }
                    .into_view()
            };

            view! {
                <section class="errors-section">
                    <h2>"❌ Validation errors"</h2>
                    {rows}
                    <Show when=move || session.with(UploadSession::has_error_log)>
                        <button class="btn btn-secondary" on:click=on_download>
                            "📄 Download error log"
                        </button>
                    </Show>
                </section>
            }
        })
    }
}
