//! Plain-text views of the storefront state, plus the JSON shapes used with `--json`.

use serde::Serialize;
use storefront_core::domain::product::Product;
use storefront_core::domain::review::Review;
use storefront_core::flows::{Notice, NoticeTone, ViewState};
use storefront_core::reviews;

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
}

impl ProductSummary {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.display_price(),
            image_url: product.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub description: String,
    pub gallery: Vec<String>,
    pub selected_image: Option<String>,
    pub details: Vec<String>,
    pub specifications: Vec<String>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<String>,
}

impl ProductView {
    pub fn new(product: &Product, selected_image: Option<&str>) -> Self {
        let reviews = reviews::for_product(&product.id);
        let average_rating = reviews::average_rating(&reviews).map(|rating| rating.to_string());
        Self {
            summary: ProductSummary::from_product(product),
            description: product.description.clone(),
            gallery: product.gallery().into_iter().map(str::to_string).collect(),
            selected_image: selected_image.map(str::to_string),
            details: product.details.clone(),
            specifications: product.specifications.clone(),
            reviews,
            average_rating,
        }
    }
}

pub fn render_catalog(state: &ViewState, currency: &str) -> String {
    let products = state.filtered_products();
    let mut lines = vec![header(state)];

    if state.search_term.trim().is_empty() {
        lines.push(format!("{} products", products.len()));
    } else {
        lines.push(format!(
            "{} of {} products match \"{}\"",
            products.len(),
            state.catalog.len(),
            state.search_term
        ));
    }

    for product in products {
        lines.push(format!("- {}  {}  {} {currency}", product.id, product.name, product.display_price()));
    }

    push_notice(&mut lines, state.notice.as_ref());
    lines.join("\n")
}

pub fn render_detail(view: &ProductView, state: &ViewState, currency: &str) -> String {
    let mut lines = vec![header(state)];
    lines.push(format!("{}  ({})", view.summary.name, view.summary.id));
    lines.push(format!("{} {currency}", view.summary.price));
    lines.push(view.description.clone());

    if !view.gallery.is_empty() {
        lines.push("images:".to_string());
        for image in &view.gallery {
            let marker = if view.selected_image.as_deref() == Some(image) { "*" } else { " " };
            lines.push(format!("  {marker} {image}"));
        }
    }
    push_section(&mut lines, "details", &view.details);
    push_section(&mut lines, "specifications", &view.specifications);

    match &view.average_rating {
        Some(average) => lines.push(format!("reviews ({}, average {average}):", view.reviews.len())),
        None => lines.push("no reviews yet".to_string()),
    }
    for review in &view.reviews {
        lines.push(format!(
            "  {} {} ({}): {}",
            review.rating.stars(),
            review.customer_name,
            review.created_at,
            review.comment
        ));
    }

    push_notice(&mut lines, state.notice.as_ref());
    lines.join("\n")
}

fn header(state: &ViewState) -> String {
    format!("storefront [{:?}] theme: {}", state.screen, state.theme.as_str())
}

fn push_section(lines: &mut Vec<String>, title: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    lines.push(format!("{title}:"));
    lines.extend(entries.iter().map(|entry| format!("  - {entry}")));
}

fn push_notice(lines: &mut Vec<String>, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };
    let tone = match notice.tone {
        NoticeTone::Success => "ok",
        NoticeTone::Failure => "!!",
    };
    lines.push(format!("[{tone}] {}", notice.message));
    if let Some(link) = &notice.manual_copy {
        lines.push(format!("     copy this link: {link}"));
    }
}
