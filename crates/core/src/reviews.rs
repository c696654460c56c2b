//! Mock customer reviews shown on the product detail view.
//!
//! Reviews are not stored remotely; they come from a fixed in-memory table keyed by the
//! demo catalog's product ids.

use rust_decimal::Decimal;

use crate::domain::product::ProductId;
use crate::domain::review::{Rating, Review};

struct ReviewSeed {
    id: &'static str,
    product_id: &'static str,
    customer_name: &'static str,
    rating: u8,
    comment: &'static str,
    created_at: &'static str,
}

const REVIEW_SEEDS: &[ReviewSeed] = &[
    ReviewSeed {
        id: "rev-001",
        product_id: "ring-silver-classic",
        customer_name: "Salma",
        rating: 5,
        comment: "Beautiful ring, exactly like the photos. Delivery was fast.",
        created_at: "2025-01-12",
    },
    ReviewSeed {
        id: "rev-002",
        product_id: "ring-silver-classic",
        customer_name: "Nadia",
        rating: 4,
        comment: "Lovely finish, runs a little small.",
        created_at: "2025-01-20",
    },
    ReviewSeed {
        id: "rev-003",
        product_id: "watch-rose-gold",
        customer_name: "Imane",
        rating: 5,
        comment: "Elegant watch, I get compliments every day.",
        created_at: "2025-02-02",
    },
    ReviewSeed {
        id: "rev-004",
        product_id: "watch-rose-gold",
        customer_name: "Khadija",
        rating: 3,
        comment: "Nice design but the strap scratches easily.",
        created_at: "2025-02-09",
    },
    ReviewSeed {
        id: "rev-005",
        product_id: "bracelet-pearl",
        customer_name: "Houda",
        rating: 4,
        comment: "Delicate and well made. Paid on delivery without any issue.",
        created_at: "2025-02-15",
    },
    ReviewSeed {
        id: "rev-006",
        product_id: "necklace-heart",
        customer_name: "Meriem",
        rating: 5,
        comment: "Perfect gift, came in a pretty box.",
        created_at: "2025-03-01",
    },
];

/// The full mock review table.
pub fn fixture() -> Vec<Review> {
    REVIEW_SEEDS
        .iter()
        .filter_map(|seed| {
            Some(Review {
                id: seed.id.to_string(),
                product_id: ProductId::new(seed.product_id),
                customer_name: seed.customer_name.to_string(),
                rating: Rating::try_from(seed.rating).ok()?,
                comment: seed.comment.to_string(),
                created_at: seed.created_at.to_string(),
            })
        })
        .collect()
}

pub fn for_product(product_id: &ProductId) -> Vec<Review> {
    fixture().into_iter().filter(|review| &review.product_id == product_id).collect()
}

/// Mean rating rounded to one decimal, `None` when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> Option<Decimal> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|review| u32::from(review.rating.value())).sum();
    let count = u32::try_from(reviews.len()).ok()?;
    Some((Decimal::from(total) / Decimal::from(count)).round_dp(1))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{average_rating, fixture, for_product, REVIEW_SEEDS};
    use crate::domain::product::ProductId;

    #[test]
    fn every_seed_has_a_valid_rating() {
        assert_eq!(fixture().len(), REVIEW_SEEDS.len());
    }

    #[test]
    fn reviews_are_filtered_by_product() {
        let reviews = for_product(&ProductId::new("watch-rose-gold"));

        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|review| review.product_id.as_str() == "watch-rose-gold"));
        assert!(for_product(&ProductId::new("unknown")).is_empty());
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        let reviews = for_product(&ProductId::new("ring-silver-classic"));

        assert_eq!(average_rating(&reviews), Some(Decimal::new(45, 1)));
        assert_eq!(average_rating(&[]), None);
    }
}
