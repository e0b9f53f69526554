use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use market_client::{
    AuthResponse, ImageUpload, Listing, ListingForm, ListingQuery, LoginForm, MarketClient,
    MarketClientError, ProfileForm, RegisterForm, ReviewForm, User,
};
use market_core::media::MediaResolver;
use market_core::session::parse_token;
use market_core::{catalog, format, time_ago};
use serde::Serialize;
use tracing::{debug, info};

mod logging;
mod settings;

use logging::init_logging;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "market-cli", version, about = "CLI клиент доски объявлений")]
struct Cli {
    /// Адрес API (по умолчанию MARKET_API_URL или http://127.0.0.1:8000).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответы API как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Текущий профиль (требует токен).
    Me,
    /// Обновление профиля (требует токен).
    ///
    /// Неуказанные поля сохраняют текущие значения.
    UpdateProfile {
        #[arg(long)]
        firstname: Option<String>,
        #[arg(long)]
        lastname: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Файл нового аватара.
        #[arg(long)]
        avatar: Option<PathBuf>,
        /// Файл новой обложки профиля.
        #[arg(long)]
        cover: Option<PathBuf>,
    },
    /// Поиск объявлений.
    Listings {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = market_core::listings::DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Карточка объявления; засчитывает просмотр.
    Show {
        #[arg(long)]
        id: i64,
    },
    /// Мои объявления (требует токен).
    Mine,
    /// Публичный профиль пользователя.
    User {
        #[arg(long)]
        id: i64,
    },
    /// Объявления пользователя.
    UserListings {
        #[arg(long)]
        id: i64,
    },
    /// Подача объявления (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        telegram: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Файл изображения; можно указать несколько раз.
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Редактирование объявления (требует токен).
    ///
    /// Неуказанные поля сохраняют текущие значения.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        telegram: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Новый файл изображения; можно указать несколько раз.
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        /// Id изображения на удаление; можно указать несколько раз.
        #[arg(long = "delete-image")]
        delete_images: Vec<i64>,
    },
    /// Удаление объявления (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
        /// Не спрашивать подтверждение.
        #[arg(long)]
        yes: bool,
    },
    /// Отзыв к объявлению (требует токен).
    Review {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Команды администратора.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Список пользователей.
    Users,
    /// Удаление пользователя.
    DeleteUser {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Удаление любого объявления.
    DeleteListing {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env(cli.server.clone())?;
    init_logging(&settings.log_level)?;
    debug!(api_url = %settings.api_url, "settings loaded");

    let mut client = MarketClient::new(settings.api_url.clone());
    if let Some(token) = load_token(&settings.token_file)
        .with_context(|| format!("не удалось прочитать {}", settings.token_file))?
    {
        client.set_token(token);
    }

    let app = App {
        media: MediaResolver::new(settings.media_url.clone()),
        json: cli.json,
    };

    let result = execute(&mut client, &app, &settings, cli.command).await;
    if let Err(err) = &result {
        if forget_stale_token(err, &settings.token_file).context("не удалось удалить токен")? {
            info!("stale token removed");
        }
    }
    result.map_err(map_error)
}

struct App {
    media: MediaResolver,
    json: bool,
}

async fn execute(
    client: &mut MarketClient,
    app: &App,
    settings: &Settings,
    command: Command,
) -> Result<()> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let form = RegisterForm {
                username,
                email,
                confirm_password: password.clone(),
                password,
            };
            let auth = client.register(&form).await?;
            persist_token(client, &settings.token_file).context("не удалось сохранить токен")?;
            app.emit(&auth, || print_auth("Регистрация успешна", &auth));
        }
        Command::Login { username, password } => {
            let auth = client.login(&LoginForm { username, password }).await?;
            persist_token(client, &settings.token_file).context("не удалось сохранить токен")?;
            app.emit(&auth, || print_auth("Вход выполнен", &auth));
        }
        Command::Logout => {
            client.clear_token();
            clear_token(&settings.token_file).context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::Me => {
            let user = client.me().await?;
            app.emit(&user, || app.print_user("Профиль", &user));
        }
        Command::UpdateProfile {
            firstname,
            lastname,
            email,
            gender,
            address,
            phone,
            bio,
            avatar,
            cover,
        } => {
            let current = client.me().await?;
            let mut form = ProfileForm::from_user(&current);
            merge(&mut form.firstname, firstname);
            merge(&mut form.lastname, lastname);
            merge(&mut form.email, email);
            merge(&mut form.gender, gender);
            merge(&mut form.address, address);
            merge(&mut form.phonenumber, phone);
            merge(&mut form.bio, bio);

            let avatar = read_optional_image(avatar.as_deref()).await?;
            let cover = read_optional_image(cover.as_deref()).await?;
            let user = client.update_me(&form, avatar, cover).await?;
            app.emit(&user, || app.print_user("Профиль обновлён", &user));
        }
        Command::Listings {
            search,
            category,
            min_price,
            max_price,
            page,
            limit,
        } => {
            let query = ListingQuery {
                search,
                category,
                min_price,
                max_price,
                page: Some(page),
                limit: Some(limit),
            };
            let page = client.list_listings(&query).await?;
            app.emit(&page, || {
                println!("Объявлений: {} (всего {})", page.items.len(), page.total);
                app.print_list(&page.items);
            });
        }
        Command::Show { id } => {
            if let Err(err) = client.record_view(id).await {
                debug!(error = %err, listing_id = id, "failed to record view");
            }
            let listing = client.get_listing(id).await?;
            app.emit(&listing, || app.print_listing(&listing));
        }
        Command::Mine => {
            let listings = client.my_listings().await?;
            app.emit(&listings, || {
                println!("Мои объявления: {}", listings.len());
                app.print_list(&listings);
            });
        }
        Command::User { id } => {
            let user = client.get_user(id).await?;
            app.emit(&user, || app.print_user("Пользователь", &user));
        }
        Command::UserListings { id } => {
            let listings = client.user_listings(id).await?;
            app.emit(&listings, || {
                println!("Объявления пользователя {id}: {}", listings.len());
                app.print_list(&listings);
            });
        }
        Command::Create {
            title,
            description,
            price,
            category,
            telegram,
            email,
            images,
        } => {
            let form = ListingForm {
                title,
                description,
                price,
                category,
                telegram_link: telegram,
                email,
            };
            let images = read_images(&images).await?;
            let listing = client.create_listing(&form, images).await?;
            app.emit(&listing, || {
                println!("Объявление создано");
                app.print_listing(&listing);
            });
        }
        Command::Update {
            id,
            title,
            description,
            price,
            category,
            telegram,
            email,
            images,
            delete_images,
        } => {
            // Неуказанные поля берём из текущей версии объявления.
            let current = client.get_listing(id).await?;
            let mut form = ListingForm::from_listing(&current);
            merge(&mut form.title, title);
            merge(&mut form.description, description);
            merge(&mut form.price, price);
            merge(&mut form.category, category);
            merge(&mut form.telegram_link, telegram);
            merge(&mut form.email, email);

            let images = read_images(&images).await?;
            let listing = client
                .update_listing(id, &form, images, &delete_images)
                .await?;
            app.emit(&listing, || {
                println!("Объявление обновлено");
                app.print_listing(&listing);
            });
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Удалить объявление {id}?"))? {
                println!("Отменено");
                return Ok(());
            }
            client.delete_listing(id).await?;
            println!("Объявление удалено: id={id}");
        }
        Command::Review {
            id,
            rating,
            comment,
        } => {
            let review = client
                .add_review(id, &ReviewForm { rating, comment })
                .await?;
            app.emit(&review, || {
                println!("Отзыв добавлен: {}★ {}", review.rating, review.comment);
            });
        }
        Command::Admin { command } => execute_admin(client, app, command).await?,
    }

    Ok(())
}

async fn execute_admin(client: &MarketClient, app: &App, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Users => {
            let users = client.list_users().await?;
            app.emit(&users, || {
                println!("Пользователей: {}", users.len());
                for user in &users {
                    let role = if user.is_admin { "admin" } else { "user" };
                    println!(
                        "- [{}] {} ({}) {}",
                        user.id,
                        user.display_name(),
                        user.email.as_deref().unwrap_or("-"),
                        role
                    );
                }
            });
        }
        AdminCommand::DeleteUser { id, yes } => {
            if !yes && !confirm(&format!("Удалить пользователя {id}?"))? {
                println!("Отменено");
                return Ok(());
            }
            client.delete_user(id).await?;
            println!("Пользователь удалён: id={id}");
        }
        AdminCommand::DeleteListing { id, yes } => {
            if !yes && !confirm(&format!("Удалить объявление {id}?"))? {
                println!("Отменено");
                return Ok(());
            }
            client.delete_listing(id).await?;
            println!("Объявление удалено: id={id}");
        }
    }
    Ok(())
}

impl App {
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) {
        if !self.json {
            human();
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Ошибка сериализации: {err}"),
        }
    }

    fn print_list(&self, listings: &[Listing]) {
        let now = Utc::now();
        for listing in listings {
            println!(
                "- [{}] {} | {} | {} | {}",
                listing.id,
                listing.title,
                format::format_price(listing.price),
                catalog::label(&listing.category),
                time_ago::format_optional(listing.created_at, now)
            );
        }
    }

    fn print_listing(&self, listing: &Listing) {
        let now = Utc::now();
        println!("id: {}", listing.id);
        println!("title: {}", listing.title);
        println!("price: {}", format::format_price(listing.price));
        println!("category: {}", catalog::label(&listing.category));
        println!(
            "posted: {}",
            time_ago::format_optional(listing.created_at, now)
        );
        println!("views: {}", listing.views);
        if let Some(owner) = &listing.owner {
            println!("owner: {} (id={})", owner.display_name(), owner.id);
        }
        if let Some(url) = listing.telegram_link.as_deref().and_then(format::telegram_url) {
            println!("telegram: {url}");
        }
        if let Some(email) = listing.email.as_deref().filter(|e| !e.trim().is_empty()) {
            println!("email: {email}");
        }
        if !listing.description.is_empty() {
            println!("description:\n{}", listing.description);
        }

        let gallery = self.media.listing_gallery(listing);
        if !gallery.is_empty() {
            println!("images:");
            for image in gallery {
                match image.id {
                    Some(id) => println!("  [{id}] {}", image.url),
                    None => println!("  {}", image.url),
                }
            }
        }

        if let Some(rating) = listing.average_rating() {
            println!("rating: {rating:.1} ({} reviews)", listing.reviews.len());
        }
        for review in &listing.reviews {
            let author = review
                .reviewer
                .as_ref()
                .map(|r| r.display_name())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {}★ {}: {} ({})",
                review.rating,
                author,
                review.comment,
                time_ago::format_optional(review.created_at, now)
            );
        }
    }

    fn print_user(&self, title: &str, user: &User) {
        println!("{title}");
        println!("id: {}", user.id);
        println!("username: {}", user.username);
        println!("name: {}", user.display_name());
        println!("email: {}", user.email.as_deref().unwrap_or("-"));
        println!("phone: {}", user.phonenumber.as_deref().unwrap_or("-"));
        println!("address: {}", user.address.as_deref().unwrap_or("-"));
        println!("bio: {}", user.bio.as_deref().unwrap_or("-"));
        println!("avatar: {}", self.media.avatar(user.profile_picture.as_deref()));
        println!("admin: {}", user.is_admin);
        println!(
            "member since: {}",
            time_ago::format_optional(user.created_at, Utc::now())
        );
    }
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.access_token);
    if let Some(user) = &auth.user {
        println!("user: {} (id={})", user.username, user.id);
    }
}

fn merge(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageUpload>> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let image = ImageUpload::from_path(path)
            .await
            .with_context(|| format!("не удалось прочитать {}", path.display()))?;
        images.push(image);
    }
    Ok(images)
}

async fn read_optional_image(path: Option<&Path>) -> Result<Option<ImageUpload>> {
    match path {
        Some(path) => Ok(Some(
            ImageUpload::from_path(path)
                .await
                .with_context(|| format!("не удалось прочитать {}", path.display()))?,
        )),
        None => Ok(None),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn load_token(path: &str) -> io::Result<Option<String>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)?;
    Ok(parse_token(&raw))
}

fn persist_token(client: &MarketClient, path: &str) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(path, token)?;
    }
    Ok(())
}

fn clear_token(path: &str) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// На 401 удаляет файл токена. Возвращает `true`, если токен был сброшен.
fn forget_stale_token(err: &anyhow::Error, path: &str) -> io::Result<bool> {
    let stale = err
        .downcast_ref::<MarketClientError>()
        .is_some_and(MarketClientError::requires_reauth);
    if stale {
        clear_token(path)?;
    }
    Ok(stale)
}

fn map_error(err: anyhow::Error) -> anyhow::Error {
    let Some(client_err) = err.downcast_ref::<MarketClientError>() else {
        return err;
    };
    let message = match client_err {
        MarketClientError::Unauthorized => format!(
            "{} (`market-cli login ...`)",
            client_err.failure().user_message()
        ),
        MarketClientError::Io(io_err) => format!("ошибка чтения файла: {io_err}"),
        other => other.failure().user_message(),
    };
    anyhow::anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_current_value_when_flag_missing() {
        let mut field = "old".to_string();
        merge(&mut field, None);
        assert_eq!(field, "old");
        merge(&mut field, Some("new".to_string()));
        assert_eq!(field, "new");
    }

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn unauthorized_error_gets_login_hint() {
        let err = map_error(anyhow::Error::new(MarketClientError::Unauthorized));
        assert!(err.to_string().contains("market-cli login"));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = map_error(anyhow::anyhow!("plain"));
        assert_eq!(err.to_string(), "plain");
    }

    #[test]
    fn token_file_round_trip() {
        let path = std::env::temp_dir().join(format!("market_token_{}", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        assert!(load_token(&path).expect("read").is_none());

        let mut client = MarketClient::new("http://127.0.0.1:8000");
        client.set_token("abc.def");
        persist_token(&client, &path).expect("write");
        assert_eq!(load_token(&path).expect("read").as_deref(), Some("abc.def"));

        clear_token(&path).expect("remove");
        clear_token(&path).expect("second remove is a no-op");
        assert!(load_token(&path).expect("read").is_none());
    }

    #[test]
    fn unauthorized_response_removes_token_file() {
        let path = std::env::temp_dir().join(format!("market_stale_token_{}", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        fs::write(&path, "expired.token").expect("write");

        let kept = forget_stale_token(&anyhow::anyhow!("network down"), &path).expect("no io error");
        assert!(!kept);
        assert!(Path::new(&path).exists());

        let err = anyhow::Error::new(MarketClientError::Unauthorized);
        assert!(forget_stale_token(&err, &path).expect("remove"));
        assert!(!Path::new(&path).exists());
        assert!(load_token(&path).expect("read").is_none());
    }

    #[test]
    fn cli_parses_repeated_images() {
        let cli = Cli::parse_from([
            "market-cli",
            "create",
            "--title",
            "Bike",
            "--price",
            "10",
            "--category",
            "vehicles",
            "--image",
            "a.png",
            "--image",
            "b.png",
        ]);
        match cli.command {
            Command::Create { images, .. } => assert_eq!(images.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
