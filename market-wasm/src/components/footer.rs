use leptos::prelude::*;

#[component]
pub(crate) fn Footer() -> impl IntoView {
    let year = chrono::Utc::now().format("%Y").to_string();

    view! {
        <footer class="footer">
            <div class="container footer-inner">
                <p>{format!("© {year} ផ្សារអនឡាញ")}</p>
                <p class="muted">"ទិញ លក់ ងាយស្រួល និងរហ័ស"</p>
            </div>
        </footer>
    }
}
