//! Status banner.

use enrol_core::UploadSession;
use leptos::*;

#[component]
pub fn NoticeBanner(session: RwSignal<UploadSession>) -> impl IntoView {
    let notice = create_memo(move |_| session.with(|s| s.notice().clone()));

    view! {
        <div
            class=move || format!("alert {}", notice.with(|n| n.level.css_class()))
            role="status"
        >
            {move || notice.with(|n| n.to_string())}
        </div>
    }
}
