use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use market_core::catalog::CATEGORIES;
use market_core::gallery::MAX_IMAGES;
use market_core::routes::Route;
use market_core::validation::{FieldErrors, ListingForm};

use crate::api;
use crate::components::error_banner::ErrorBanner;
use crate::pages::{
    FieldError, clear_files, release_previews_on_cleanup, replace_previews, selected_files,
};
use crate::router::navigate;
use crate::state::AppState;

/// Поля формы объявления, общие для подачи и редактирования.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListingFields {
    pub(crate) title: RwSignal<String>,
    pub(crate) description: RwSignal<String>,
    pub(crate) price: RwSignal<String>,
    pub(crate) category: RwSignal<String>,
    pub(crate) telegram_link: RwSignal<String>,
    pub(crate) email: RwSignal<String>,
}

impl ListingFields {
    pub(crate) fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
            category: RwSignal::new(String::new()),
            telegram_link: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
        }
    }

    pub(crate) fn fill(&self, form: ListingForm) {
        self.title.set(form.title);
        self.description.set(form.description);
        self.price.set(form.price);
        self.category.set(form.category);
        self.telegram_link.set(form.telegram_link);
        self.email.set(form.email);
    }

    pub(crate) fn form(&self) -> ListingForm {
        ListingForm {
            title: self.title.get_untracked(),
            description: self.description.get_untracked(),
            price: self.price.get_untracked(),
            category: self.category.get_untracked(),
            telegram_link: self.telegram_link.get_untracked(),
            email: self.email.get_untracked(),
        }
    }
}

/// Текстовые поля объявления с ошибками под каждым.
#[component]
pub(crate) fn ListingFieldsView(fields: ListingFields, errors: RwSignal<FieldErrors>) -> impl IntoView {
    view! {
        <label>
            "ចំណងជើង *"
            <input
                prop:value=move || fields.title.get()
                on:input=move |ev| fields.title.set(event_target_value(&ev))
            />
        </label>
        <FieldError errors=errors field="title" />

        <label>
            "តម្លៃ (USD) *"
            <input
                type="number"
                min="0"
                step="0.01"
                prop:value=move || fields.price.get()
                on:input=move |ev| fields.price.set(event_target_value(&ev))
            />
        </label>
        <FieldError errors=errors field="price" />

        <label>
            "ប្រភេទ *"
            <select
                prop:value=move || fields.category.get()
                on:change=move |ev| fields.category.set(event_target_value(&ev))
            >
                <option value="">"-- ជ្រើសរើសប្រភេទ --"</option>
                {CATEGORIES
                    .iter()
                    .map(|c| view! { <option value=c.slug>{format!("{} {}", c.icon, c.label)}</option> })
                    .collect_view()}
            </select>
        </label>
        <FieldError errors=errors field="category" />

        <label>
            "ការពិពណ៌នា"
            <textarea
                rows="6"
                prop:value=move || fields.description.get()
                on:input=move |ev| fields.description.set(event_target_value(&ev))
            ></textarea>
        </label>
        <FieldError errors=errors field="description" />

        <label>
            "Telegram"
            <input
                placeholder="@username"
                prop:value=move || fields.telegram_link.get()
                on:input=move |ev| fields.telegram_link.set(event_target_value(&ev))
            />
        </label>
        <FieldError errors=errors field="telegram_link" />

        <label>
            "អ៊ីមែល"
            <input
                type="email"
                prop:value=move || fields.email.get()
                on:input=move |ev| fields.email.set(event_target_value(&ev))
            />
        </label>
        <FieldError errors=errors field="email" />
    }
}

#[component]
pub(crate) fn PostAdPage(state: AppState) -> impl IntoView {
    let fields = ListingFields::new();
    let field_errors = RwSignal::new(FieldErrors::default());
    let error = RwSignal::new(None::<String>);
    let sending = RwSignal::new(false);
    let files_input: NodeRef<Input> = NodeRef::new();
    let previews = RwSignal::new(Vec::<String>::new());
    release_previews_on_cleanup(previews);

    let on_files = move |_| {
        let files = selected_files(files_input);
        if files.len() > MAX_IMAGES {
            error.set(Some(format!("អាចបញ្ចូលរូបភាពបានច្រើនបំផុត {MAX_IMAGES}")));
            clear_files(files_input);
            replace_previews(previews, &[]);
            return;
        }
        error.set(None);
        replace_previews(previews, &files);
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        error.set(None);

        // Невалидная форма не уходит в сеть.
        let draft = match fields.form().validate() {
            Ok(draft) => draft,
            Err(errors) => {
                field_errors.set(errors);
                return;
            }
        };
        field_errors.set(FieldErrors::default());

        let Some(token) = state.token.get_untracked() else {
            navigate(state, &Route::Login.path());
            return;
        };
        let images = selected_files(files_input);
        if images.len() > MAX_IMAGES {
            error.set(Some(format!("អាចបញ្ចូលរូបភាពបានច្រើនបំផុត {MAX_IMAGES}")));
            return;
        }

        sending.set(true);
        spawn_local(async move {
            match api::create_listing(&token, &draft, &images).await {
                Ok(created) => navigate(state, &Route::ListingDetail(created.id).path()),
                Err(err) => error.set(Some(state.failure_message(&err))),
            }
            sending.set(false);
        });
    };

    view! {
        <section class="container narrow">
            <h1 class="page-title">"ដាក់លក់ទំនិញ"</h1>
            <form class="card form" on:submit=on_submit>
                <ErrorBanner error=error />
                <ListingFieldsView fields=fields errors=field_errors />

                <label>
                    {format!("រូបភាព (អតិបរមា {MAX_IMAGES})")}
                    <input
                        type="file"
                        accept="image/*"
                        multiple=true
                        node_ref=files_input
                        on:change=on_files
                    />
                </label>
                <div class="preview-grid">
                    <For
                        each=move || previews.get()
                        key=|url| url.clone()
                        children=|url| view! { <img class="preview" src=url alt="" /> }
                    />
                </div>

                <button type="submit" class="btn btn-primary" disabled=move || sending.get()>
                    {move || if sending.get() { "កំពុងបង្ហោះ..." } else { "ដាក់លក់" }}
                </button>
            </form>
        </section>
    }
}
