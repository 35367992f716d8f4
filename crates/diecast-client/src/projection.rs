//! Read-only views assembled from the session repositories.
//!
//! Nothing in here mutates state. Every view is a plain serializable struct
//! with display-ready strings, so the renderer only has to lay them out.

use diecast_shared::constants::{CURRENCY_SIGN, DEFAULT_DISPLAY_NAME, MAX_REVIEW_RATING};
use diecast_shared::error::Result;
use diecast_shared::identity::avatar_letter;
use diecast_shared::share_link;
use diecast_shared::types::{ProductId, Rarity, UserId};
use diecast_store::{ListFilter, Product, Review, SearchOutcome};
use serde::Serialize;

use crate::state::AppState;

/// A listing as shown in a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub city: String,
    pub rarity: String,
    pub seller_name: String,
    pub seller_rating: String,
    pub cover_image: Option<String>,
    pub is_favorite: bool,
    pub is_own: bool,
    pub sold: bool,
}

/// A single listing with everything the detail page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub description: String,
    pub rarity: String,
    pub condition: String,
    pub city: String,
    pub images: Vec<String>,
    pub seller_id: UserId,
    pub seller_name: String,
    pub seller_avatar: String,
    pub seller_contact: String,
    pub seller_rating: String,
    pub seller_review_count: u32,
    pub listed_on: String,
    pub sold: bool,
    pub is_favorite: bool,
    pub is_own: bool,
    pub share_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub buyer_id: UserId,
    pub buyer_name: String,
    pub stars: String,
    pub text: String,
    pub date: String,
    pub edited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfileView {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
    pub rating: f64,
    pub rating_stars: String,
    pub review_count: u32,
    pub active_count: usize,
    pub sold_count: usize,
    pub is_self: bool,
    pub reviews: Vec<ReviewView>,
}

/// Active listings, newest first, optionally narrowed to one rarity.
pub fn home_feed(state: &AppState, rarity: Option<Rarity>) -> Vec<ProductCard> {
    let filter = ListFilter {
        rarity,
        include_sold: false,
    };
    cards(state, state.catalog.list(&filter))
}

/// Search results; `None` when the query is blank.
pub fn search(state: &AppState, query: &str) -> Option<Vec<ProductCard>> {
    match state.catalog.search(query) {
        SearchOutcome::NoQuery => None,
        SearchOutcome::Matches(hits) => Some(cards(state, hits)),
    }
}

/// Favorited listings that still exist, sold ones included.
pub fn favorites_view(state: &AppState) -> Vec<ProductCard> {
    let all = ListFilter {
        include_sold: true,
        ..ListFilter::default()
    };
    let products = state
        .catalog
        .list(&all)
        .into_iter()
        .filter(|p| state.favorites.has(p.id))
        .collect();
    cards(state, products)
}

pub fn seller_listings(state: &AppState, seller_id: &UserId, include_sold: bool) -> Vec<ProductCard> {
    let products = state
        .catalog
        .products_by_seller(seller_id)
        .into_iter()
        .filter(|p| include_sold || p.is_active())
        .collect();
    cards(state, products)
}

pub fn seller_profile(state: &AppState, seller_id: &UserId) -> SellerProfileView {
    let me = state.identity.current();
    let is_self = &me.id == seller_id;
    let listings = state.catalog.products_by_seller(seller_id);
    let reviews = state.reviews.list_for_seller(seller_id);
    let stats = state.reviews.seller_stats(seller_id);

    // Without a live profile the newest listing snapshot is the best source.
    let (name, avatar) = if is_self {
        (me.display_name.clone(), me.avatar.clone())
    } else if let Some(p) = listings.first() {
        (p.seller.name.clone(), p.seller.avatar.clone())
    } else if let Some(r) = reviews.last() {
        (r.seller_name.clone(), avatar_letter(&r.seller_name))
    } else {
        (DEFAULT_DISPLAY_NAME.to_string(), avatar_letter(DEFAULT_DISPLAY_NAME))
    };

    let mut review_views: Vec<ReviewView> = reviews.into_iter().map(review_view).collect();
    review_views.reverse();

    SellerProfileView {
        id: seller_id.clone(),
        name,
        avatar,
        rating: stats.rating,
        rating_stars: rating_stars(stats.rating),
        review_count: stats.review_count,
        active_count: listings.iter().filter(|p| p.is_active()).count(),
        sold_count: listings.iter().filter(|p| !p.is_active()).count(),
        is_self,
        reviews: review_views,
    }
}

pub fn product_detail(state: &AppState, id: ProductId) -> Result<ProductDetail> {
    let product = state.catalog.get(id)?;
    let stats = state.reviews.seller_stats(&product.seller.id);
    let share_url = share_link::share_url(&state.config.base_url, id)
        .map_err(|e| tracing::warn!(error = %e, "share link unavailable"))
        .ok();

    Ok(ProductDetail {
        id,
        price: format_price(product.price),
        rarity: product.rarity.label().to_string(),
        condition: product.condition.label().to_string(),
        seller_rating: rating_stars(stats.rating),
        seller_review_count: stats.review_count,
        listed_on: product.created_at.format("%d.%m.%Y").to_string(),
        sold: !product.is_active(),
        is_favorite: state.favorites.has(id),
        is_own: product.is_owned_by(&state.identity.current().id),
        share_url,
        title: product.title,
        description: product.description,
        city: product.city,
        images: product.images,
        seller_id: product.seller.id,
        seller_name: product.seller.name,
        seller_avatar: product.seller.avatar,
        seller_contact: product.seller.contact,
    })
}

/// Format a price with thousands separated by spaces: `5 900 ₽`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    format!("{grouped} {CURRENCY_SIGN}")
}

/// Star bar followed by the one-decimal value: `★★★★☆ 4.5`.
pub fn rating_stars(rating: f64) -> String {
    let filled = rating.clamp(0.0, MAX_REVIEW_RATING as f64).floor() as u8;
    format!("{} {rating:.1}", stars(filled))
}

fn stars(filled: u8) -> String {
    let filled = filled.min(MAX_REVIEW_RATING) as usize;
    let empty = MAX_REVIEW_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

fn cards(state: &AppState, products: Vec<&Product>) -> Vec<ProductCard> {
    let me = &state.identity.current().id;
    products
        .into_iter()
        .map(|p| ProductCard {
            id: p.id,
            title: p.title.clone(),
            price: format_price(p.price),
            city: p.city.clone(),
            rarity: p.rarity.label().to_string(),
            seller_name: p.seller.name.clone(),
            seller_rating: rating_stars(state.reviews.seller_rating(&p.seller.id)),
            cover_image: state.catalog.cover_image(p),
            is_favorite: state.favorites.has(p.id),
            is_own: p.is_owned_by(me),
            sold: !p.is_active(),
        })
        .collect()
}

fn review_view(review: &Review) -> ReviewView {
    ReviewView {
        id: review.id.to_string(),
        buyer_id: review.buyer_id.clone(),
        buyer_name: review.buyer_name.clone(),
        stars: stars(review.rating),
        text: review.text.clone(),
        date: review.last_changed().format("%d.%m.%Y").to_string(),
        edited: review.updated_at.is_some(),
    }
}
