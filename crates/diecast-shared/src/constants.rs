/// Application name
pub const APP_NAME: &str = "Diecast Market";

/// Store key of the current user identity
pub const KEY_USER: &str = "hotwheels_user";

/// Store key of the product catalog (array of products)
pub const KEY_PRODUCTS: &str = "hotwheels_products";

/// Store key of the review ledger (array of reviews)
pub const KEY_REVIEWS: &str = "hotwheels_reviews";

/// Store key of the favorites set (array of product ids)
pub const KEY_FAVORITES: &str = "hotwheels_favorites";

/// Prefix of photo blob keys: `{prefix}{productId}_{index}`
pub const PHOTO_KEY_PREFIX: &str = "hotwheels_photo_";

/// Lowest accepted listing price
pub const MIN_PRICE: u64 = 1;

/// Highest accepted listing price (sanity bound)
pub const MAX_PRICE: u64 = 10_000_000;

/// Maximum photos attached to one listing
pub const MAX_PHOTOS: usize = 3;

/// Maximum size of one photo in bytes (5 MiB)
pub const MAX_PHOTO_SIZE: usize = 5 * 1024 * 1024;

/// Accepted photo MIME types
pub const ALLOWED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Rating of a seller with no reviews
pub const DEFAULT_RATING: f64 = 5.0;

/// Review rating bounds
pub const MIN_REVIEW_RATING: u8 = 1;
pub const MAX_REVIEW_RATING: u8 = 5;

/// Maximum review text length in characters
pub const MAX_REVIEW_LEN: usize = 1000;

/// Display name used when none is available
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Avatar letter for platform users without a usable name
pub const PLATFORM_AVATAR: &str = "TG";

/// Id namespace of identities handed over by the host messaging platform
pub const PLATFORM_ID_PREFIX: &str = "tg_";

/// Length of the random suffix of locally generated user ids
pub const LOCAL_ID_SUFFIX_LEN: usize = 6;

/// Query parameter carrying a shared product id
pub const SHARE_PARAM: &str = "product";

/// Default capacity of the client key-value store (5 MiB)
pub const DEFAULT_STORE_QUOTA: usize = 5 * 1024 * 1024;

/// Currency sign appended to formatted prices
pub const CURRENCY_SIGN: &str = "₽";
