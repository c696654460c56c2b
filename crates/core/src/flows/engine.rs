use thiserror::Error;

use crate::catalog::Catalog;
use crate::checkout;
use crate::domain::order::{Order, OrderDetails};
use crate::domain::product::ProductId;
use crate::flows::states::{
    FlowContext, Notice, NoticeSource, NoticeTone, Screen, TransitionOutcome, ViewAction,
    ViewEvent, ViewState,
};
use crate::messages;
use crate::share::ShareRequest;

pub struct FlowEngine {
    context: FlowContext,
}

impl FlowEngine {
    pub fn new(context: FlowContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn initial_state(&self) -> ViewState {
        ViewState::default()
    }

    pub fn apply(
        &self,
        current: &ViewState,
        event: &ViewEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition(current, event, &self.context)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {screen:?} using event `{event}`")]
    InvalidTransition { screen: Screen, event: &'static str },
    #[error("product `{0}` is not in the catalog")]
    UnknownProduct(ProductId),
    #[error("image `{0}` is not part of the selected product gallery")]
    ImageNotInGallery(String),
}

/// Applies one event to the view state. Pure: the same state and event always yield the
/// same outcome, and side effects are only described through the returned actions.
pub fn transition(
    current: &ViewState,
    event: &ViewEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use Screen::{Catalog as CatalogScreen, Checkout, Detail};

    let mut next = current.clone();
    let mut actions = Vec::new();
    let invalid =
        || FlowTransitionError::InvalidTransition { screen: current.screen, event: event.name() };

    match (current.screen, event) {
        (_, ViewEvent::Activated { query }) => {
            if !current.activated {
                next.activated = true;
                next.loading = true;
                next.deep_link = query.product.clone();
                actions.push(ViewAction::FetchCatalog);
            }
        }
        (CatalogScreen, ViewEvent::CatalogLoaded { products }) => {
            if !current.activated || !current.loading {
                return Err(invalid());
            }
            next.catalog = Catalog::new(products.clone());
            next.loading = false;
            next.error = None;
            if let Some(product_id) = next.deep_link.take() {
                if next.catalog.find(&product_id).is_some() {
                    select(&mut next, product_id);
                }
            }
        }
        (_, ViewEvent::CatalogFailed { .. }) => {
            if !current.activated || !current.loading {
                return Err(invalid());
            }
            next.catalog = Catalog::default();
            next.loading = false;
            next.deep_link = None;
            next.error = Some(messages::CATALOG_LOAD_FAILED.to_string());
        }
        (_, ViewEvent::SearchChanged(term)) => next.search_term = term.clone(),
        (CatalogScreen, ViewEvent::ProductSelected(product_id)) => {
            if current.catalog.find(product_id).is_none() {
                return Err(FlowTransitionError::UnknownProduct(product_id.clone()));
            }
            select(&mut next, product_id.clone());
        }
        (Detail, ViewEvent::ImageSelected(image)) => {
            let in_gallery = current
                .selected_product()
                .is_some_and(|product| product.gallery().contains(&image.as_str()));
            if !in_gallery {
                return Err(FlowTransitionError::ImageNotInGallery(image.clone()));
            }
            next.selected_image = Some(image.clone());
        }
        (Detail, ViewEvent::BuyNow) => next.screen = Checkout,
        (Detail | Checkout, ViewEvent::Back) => {
            if current.submitting {
                return Err(invalid());
            }
            next.screen = CatalogScreen;
            next.selected = None;
            next.selected_image = None;
        }
        (Checkout, ViewEvent::DraftEdited { field, value }) => next.draft.set(*field, value.clone()),
        (Checkout, ViewEvent::SubmitRequested) => {
            if let Some(product) = current.selected_product().filter(|_| !current.submitting) {
                match checkout::validate(&current.draft) {
                    Ok(()) => {
                        next.submitting = true;
                        next.notice = None;
                        actions.push(ViewAction::WriteOrder(Order::pending(
                            product,
                            current.draft.clone(),
                        )));
                    }
                    Err(error) => {
                        next.notice = Some(Notice::blocking(
                            NoticeTone::Failure,
                            NoticeSource::Validation,
                            error.user_message(),
                        ));
                    }
                }
            }
        }
        (Checkout, ViewEvent::OrderPlaced { .. }) => {
            if !current.submitting {
                return Err(invalid());
            }
            next.submitting = false;
            next.draft = OrderDetails::default();
            next.selected = None;
            next.selected_image = None;
            next.screen = CatalogScreen;
            next.notice = Some(Notice::blocking(
                NoticeTone::Success,
                NoticeSource::Order,
                messages::ORDER_PLACED,
            ));
        }
        (Checkout, ViewEvent::OrderFailed { .. }) => {
            if !current.submitting {
                return Err(invalid());
            }
            next.submitting = false;
            next.notice =
                Some(Notice::blocking(NoticeTone::Failure, NoticeSource::Order, messages::ORDER_FAILED));
        }
        (Detail | Checkout, ViewEvent::ShareRequested) => {
            let product = current.selected_product().ok_or_else(invalid)?;
            actions.push(ViewAction::ShareProduct(ShareRequest::for_product(
                product,
                &context.origin,
            )));
        }
        (_, ViewEvent::ShareFinished { outcome, at }) => {
            let tone = if outcome.is_success() { NoticeTone::Success } else { NoticeTone::Failure };
            next.notice = Some(Notice {
                tone,
                source: NoticeSource::Share,
                message: outcome.message().to_string(),
                expires_at: Some(*at + context.notice_ttl),
                manual_copy: outcome.manual_copy_link().map(str::to_string),
            });
        }
        (_, ViewEvent::Tick { now }) => {
            if current.notice.as_ref().is_some_and(|notice| notice.is_expired(*now)) {
                next.notice = None;
            }
        }
        (_, ViewEvent::NoticeDismissed) => next.notice = None,
        (_, ViewEvent::ThemeLoaded(theme)) => next.theme = *theme,
        (_, ViewEvent::ThemeToggled) => {
            next.theme = current.theme.toggled();
            actions.push(ViewAction::PersistTheme(next.theme));
        }
        _ => return Err(invalid()),
    }

    Ok(TransitionOutcome {
        from: current.screen,
        to: next.screen,
        event: event.clone(),
        state: next,
        actions,
    })
}

fn select(state: &mut ViewState, product_id: ProductId) {
    state.selected_image = state
        .catalog
        .find(&product_id)
        .and_then(|product| product.gallery().first().map(|image| image.to_string()));
    state.selected = Some(product_id);
    state.screen = Screen::Detail;
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use url::Url;

    use crate::domain::order::{DraftField, OrderStatus};
    use crate::domain::preference::ThemePreference;
    use crate::domain::product::{Price, Product, ProductId};
    use crate::flows::engine::{FlowEngine, FlowTransitionError};
    use crate::flows::states::{
        FlowContext, NavigationQuery, NoticeSource, NoticeTone, Screen, ViewAction, ViewEvent,
        ViewState,
    };
    use crate::messages;
    use crate::share::ShareOutcome;

    fn engine() -> FlowEngine {
        FlowEngine::new(FlowContext::new(Url::parse("https://shop.example").expect("origin")))
    }

    fn product(id: &str, name: &str, images: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::Text("19.9".to_string()),
            image_url: images.first().map(|image| image.to_string()).unwrap_or_default(),
            description: format!("{name} description"),
            additional_images: images.iter().skip(1).map(|image| image.to_string()).collect(),
            details: Vec::new(),
            specifications: Vec::new(),
        }
    }

    fn products() -> Vec<Product> {
        vec![
            product("p1", "Silver Ring", &["ring.jpg", "ring-side.jpg"]),
            product("p2", "Rose Watch", &["watch.jpg"]),
        ]
    }

    fn run(engine: &FlowEngine, state: ViewState, events: &[ViewEvent]) -> ViewState {
        events.iter().fold(state, |state, event| {
            engine.apply(&state, event).expect("transition should succeed").state
        })
    }

    fn loaded(engine: &FlowEngine, query: NavigationQuery) -> ViewState {
        run(
            engine,
            engine.initial_state(),
            &[ViewEvent::Activated { query }, ViewEvent::CatalogLoaded { products: products() }],
        )
    }

    fn filled_checkout(engine: &FlowEngine) -> ViewState {
        let state = loaded(engine, NavigationQuery::default());
        run(
            engine,
            state,
            &[
                ViewEvent::ProductSelected(ProductId::new("p1")),
                ViewEvent::BuyNow,
                ViewEvent::DraftEdited { field: DraftField::FullName, value: "Salma B".into() },
                ViewEvent::DraftEdited { field: DraftField::Phone, value: "+212640987767".into() },
                ViewEvent::DraftEdited { field: DraftField::Address, value: "Rue d'Alger".into() },
                ViewEvent::DraftEdited { field: DraftField::City, value: "Tetouan".into() },
            ],
        )
    }

    #[test]
    fn activation_requests_one_catalog_fetch() {
        let engine = engine();
        let first = engine
            .apply(&engine.initial_state(), &ViewEvent::Activated { query: NavigationQuery::default() })
            .expect("activate");
        assert_eq!(first.actions, vec![ViewAction::FetchCatalog]);

        let again = engine
            .apply(&first.state, &ViewEvent::Activated { query: NavigationQuery::default() })
            .expect("repeat activation");
        assert!(again.actions.is_empty());
    }

    #[test]
    fn deep_link_preselects_loaded_product() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::product("p1"));

        assert!(!state.loading);
        assert_eq!(state.screen, Screen::Detail);
        assert_eq!(state.selected, Some(ProductId::new("p1")));
        assert_eq!(state.selected_image.as_deref(), Some("ring.jpg"));
        assert_eq!(state.deep_link, None);
    }

    #[test]
    fn unknown_deep_link_stays_on_catalog() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::product("gone"));

        assert_eq!(state.screen, Screen::Catalog);
        assert_eq!(state.selected, None);
        assert_eq!(state.catalog.len(), 2);
    }

    #[test]
    fn catalog_failure_sets_static_message_and_no_products() {
        let engine = engine();
        let state = run(
            &engine,
            engine.initial_state(),
            &[
                ViewEvent::Activated { query: NavigationQuery::product("p1") },
                ViewEvent::CatalogFailed { reason: "connection refused".into() },
            ],
        );

        assert!(!state.loading);
        assert!(state.catalog.is_empty());
        assert_eq!(state.error.as_deref(), Some(messages::CATALOG_LOAD_FAILED));
        assert_eq!(state.screen, Screen::Catalog);
    }

    #[test]
    fn catalog_cannot_load_twice() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::default());
        let error = engine
            .apply(&state, &ViewEvent::CatalogLoaded { products: Vec::new() })
            .expect_err("second load");

        assert_eq!(
            error,
            FlowTransitionError::InvalidTransition { screen: Screen::Catalog, event: "catalog_loaded" }
        );
    }

    #[test]
    fn search_filters_without_touching_catalog() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::default());
        let state = run(&engine, state, &[ViewEvent::SearchChanged("WATCH".into())]);

        let names: Vec<&str> =
            state.filtered_products().iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec!["Rose Watch"]);
        assert_eq!(state.catalog.len(), 2);
    }

    #[test]
    fn buy_now_is_rejected_on_catalog_screen() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::default());
        let error = engine.apply(&state, &ViewEvent::BuyNow).expect_err("no product open");

        assert!(matches!(
            error,
            FlowTransitionError::InvalidTransition { screen: Screen::Catalog, event: "buy_now" }
        ));
    }

    #[test]
    fn selecting_unknown_product_is_rejected() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::default());
        let error = engine
            .apply(&state, &ViewEvent::ProductSelected(ProductId::new("nope")))
            .expect_err("unknown product");

        assert_eq!(error, FlowTransitionError::UnknownProduct(ProductId::new("nope")));
    }

    #[test]
    fn image_selection_is_limited_to_gallery() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::product("p1"));

        let switched = run(&engine, state.clone(), &[ViewEvent::ImageSelected("ring-side.jpg".into())]);
        assert_eq!(switched.selected_image.as_deref(), Some("ring-side.jpg"));

        let error = engine
            .apply(&state, &ViewEvent::ImageSelected("watch.jpg".into()))
            .expect_err("foreign image");
        assert_eq!(error, FlowTransitionError::ImageNotInGallery("watch.jpg".into()));
    }

    #[test]
    fn invalid_phone_blocks_submission_without_write() {
        let engine = engine();
        let state = run(
            &engine,
            filled_checkout(&engine),
            &[ViewEvent::DraftEdited { field: DraftField::Phone, value: "0640".into() }],
        );

        let outcome = engine.apply(&state, &ViewEvent::SubmitRequested).expect("submit");
        let notice = outcome.state.notice.expect("validation notice");

        assert!(outcome.actions.is_empty());
        assert!(!outcome.state.submitting);
        assert_eq!(notice.message, messages::INVALID_PHONE);
        assert_eq!(notice.source, NoticeSource::Validation);
    }

    #[test]
    fn blank_city_blocks_submission_without_write() {
        let engine = engine();
        let state = run(
            &engine,
            filled_checkout(&engine),
            &[ViewEvent::DraftEdited { field: DraftField::City, value: "   ".into() }],
        );

        let outcome = engine.apply(&state, &ViewEvent::SubmitRequested).expect("submit");

        assert!(outcome.actions.is_empty());
        assert_eq!(
            outcome.state.notice.map(|notice| notice.message),
            Some(messages::MISSING_REQUIRED_FIELDS.to_string())
        );
    }

    #[test]
    fn valid_submission_writes_one_pending_order_and_resets() {
        let engine = engine();
        let submitted =
            engine.apply(&filled_checkout(&engine), &ViewEvent::SubmitRequested).expect("submit");

        let [ViewAction::WriteOrder(order)] = submitted.actions.as_slice() else {
            panic!("expected exactly one order write, got {:?}", submitted.actions);
        };
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.product_id, ProductId::new("p1"));
        assert_eq!(order.customer_details.city, "Tetouan");
        assert!(submitted.state.submitting);

        let ignored = engine.apply(&submitted.state, &ViewEvent::SubmitRequested).expect("resubmit");
        assert!(ignored.actions.is_empty());

        let placed = engine
            .apply(&submitted.state, &ViewEvent::OrderPlaced { order_id: "o-1".into() })
            .expect("placed");
        assert_eq!(placed.to, Screen::Catalog);
        assert!(placed.state.draft.is_empty());
        assert_eq!(placed.state.selected, None);
        assert!(!placed.state.submitting);
        assert_eq!(
            placed.state.notice.map(|notice| (notice.tone, notice.message)),
            Some((NoticeTone::Success, messages::ORDER_PLACED.to_string()))
        );
    }

    #[test]
    fn failed_write_keeps_draft_and_clears_submitting() {
        let engine = engine();
        let checkout = filled_checkout(&engine);
        let submitted = run(&engine, checkout.clone(), &[ViewEvent::SubmitRequested]);
        let failed = run(&engine, submitted, &[ViewEvent::OrderFailed { reason: "offline".into() }]);

        assert_eq!(failed.screen, Screen::Checkout);
        assert_eq!(failed.draft, checkout.draft);
        assert!(!failed.submitting);
        assert_eq!(failed.notice.map(|notice| notice.message), Some(messages::ORDER_FAILED.to_string()));
    }

    #[test]
    fn share_builds_deep_link_request() {
        let engine = engine();
        let state = loaded(&engine, NavigationQuery::product("p2"));
        let outcome = engine.apply(&state, &ViewEvent::ShareRequested).expect("share");

        let [ViewAction::ShareProduct(request)] = outcome.actions.as_slice() else {
            panic!("expected a share action");
        };
        assert_eq!(request.url, "https://shop.example/?product=p2");
        assert_eq!(request.title, "Rose Watch");
    }

    #[test]
    fn share_notice_expires_after_ttl() {
        let engine = engine();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("timestamp");
        let state = run(
            &engine,
            loaded(&engine, NavigationQuery::product("p1")),
            &[ViewEvent::ShareFinished {
                outcome: ShareOutcome::CopyFailed { link: "https://shop.example/?product=p1".into() },
                at,
            }],
        );
        let notice = state.notice.clone().expect("share notice");
        assert_eq!(notice.message, messages::COPY_FAILED);
        assert_eq!(notice.manual_copy.as_deref(), Some("https://shop.example/?product=p1"));

        let early = run(&engine, state.clone(), &[ViewEvent::Tick { now: at + Duration::seconds(2) }]);
        assert!(early.notice.is_some());
        let late = run(&engine, state, &[ViewEvent::Tick { now: at + Duration::seconds(3) }]);
        assert!(late.notice.is_none());
    }

    #[test]
    fn theme_toggle_requests_persistence() {
        let engine = engine();
        let state = run(&engine, engine.initial_state(), &[ViewEvent::ThemeLoaded(ThemePreference::Dark)]);
        let outcome = engine.apply(&state, &ViewEvent::ThemeToggled).expect("toggle");

        assert_eq!(outcome.state.theme, ThemePreference::Light);
        assert_eq!(outcome.actions, vec![ViewAction::PersistTheme(ThemePreference::Light)]);
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let engine = engine();
        let events = [
            ViewEvent::Activated { query: NavigationQuery::default() },
            ViewEvent::CatalogLoaded { products: products() },
            ViewEvent::SearchChanged("ring".into()),
            ViewEvent::ProductSelected(ProductId::new("p1")),
            ViewEvent::BuyNow,
            ViewEvent::DraftEdited { field: DraftField::Phone, value: "123".into() },
            ViewEvent::SubmitRequested,
            ViewEvent::Back,
        ];

        let replay = || {
            let mut state = engine.initial_state();
            let mut actions = Vec::new();
            for event in &events {
                let outcome = engine.apply(&state, event).expect("deterministic run");
                actions.push(outcome.actions);
                state = outcome.state;
            }
            (state, actions)
        };

        assert_eq!(replay(), replay());
    }
}
