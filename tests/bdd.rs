use std::{fmt, fs::File, net::SocketAddr};

use anyhow::Context;
use cucumber::{given, then, when, World as _};
use tempfile::TempDir;
use wanderly::{
    auth::{self, AuthenticatedUser},
    config::AppConfig,
    db::init_pool,
    error::AppError,
    flash::Flash,
    guards,
    itinerary::{self, group_by_date},
    queries,
    state::AppState,
    validation::{self, ActivityInput},
};

const TRIPS_PER_PAGE: i64 = 8;

#[derive(Debug, cucumber::World, Default)]
struct AppWorld {
    state: Option<TestState>,
    current_user: Option<AuthenticatedUser>,
    trip_id: Option<i64>,
    foreign_trip_id: Option<i64>,
    last_denial: Option<AppError>,
    registration_error: Option<String>,
}

impl AppWorld {
    fn app_state(&self) -> &AppState {
        self.state
            .as_ref()
            .expect("state must be initialised first")
            .app()
    }

    fn user(&self) -> &AuthenticatedUser {
        self.current_user
            .as_ref()
            .expect("a user must be registered first")
    }

    fn flash(&self) -> Flash {
        Flash::from_key(self.app_state().cookie_key.clone())
    }
}

struct TestState {
    app: AppState,
    _root: TempDir,
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState").finish()
    }
}

impl TestState {
    async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for bdd world")?;
        let db_path = root.path().join("bdd.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url: database_url.clone(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cookie_secret: "bdd-cookie-secret".into(),
        };

        let db = init_pool(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&db).await?;

        let app = AppState::new(config, db);
        Ok(Self { app, _root: root })
    }

    fn app(&self) -> &AppState {
        &self.app
    }
}

#[given("a fresh application state")]
async fn given_fresh_state(world: &mut AppWorld) {
    world.state = Some(TestState::new().await.expect("state"));
    world.current_user = None;
    world.trip_id = None;
    world.foreign_trip_id = None;
    world.last_denial = None;
    world.registration_error = None;
}

#[given(
    regex = r#"^a registered user \"([^\"]+)\" with email \"([^\"]+)\" and password \"([^\"]+)\"$"#
)]
async fn given_registered_user(
    world: &mut AppWorld,
    full_name: String,
    email: String,
    password: String,
) {
    register_user(world, full_name, email, password).await;
}

#[when(
    regex = r#"^I register a user \"([^\"]+)\" with email \"([^\"]+)\" and password \"([^\"]+)\"$"#
)]
async fn when_register_user(
    world: &mut AppWorld,
    full_name: String,
    email: String,
    password: String,
) {
    register_user(world, full_name, email, password).await;
}

#[when(regex = r#"^I try to register another user with email \"([^\"]+)\"$"#)]
async fn when_register_duplicate(world: &mut AppWorld, email: String) {
    match auth::register_user(world.app_state(), "Someone Else", &email, "another-password").await
    {
        Ok(_) => world.registration_error = None,
        Err(AppError::BadRequest(message)) => world.registration_error = Some(message),
        Err(err) => panic!("unexpected registration failure: {err:?}"),
    }
}

#[then("registration fails because the email is taken")]
async fn then_registration_rejected(world: &mut AppWorld) {
    let message = world
        .registration_error
        .as_deref()
        .expect("registration should have been rejected");
    assert!(message.contains("already exists"), "got: {message}");
}

#[then(regex = r#"^I can authenticate as \"([^\"]+)\" using password \"([^\"]+)\"$"#)]
async fn then_can_authenticate(world: &mut AppWorld, email: String, password: String) {
    let authed = auth::authenticate_user(world.app_state(), &email, &password)
        .await
        .expect("authentication");
    assert_eq!(authed.email.to_lowercase(), email.to_lowercase());
}

#[then(regex = r#"^authentication as \"([^\"]+)\" with password \"([^\"]+)\" fails$"#)]
async fn then_cannot_authenticate(world: &mut AppWorld, email: String, password: String) {
    let result = auth::authenticate_user(world.app_state(), &email, &password).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[when(regex = r#"^I create a trip to \"([^\"]+)\" departing \"([^\"]+)\" and returning \"([^\"]+)\"$"#)]
async fn when_create_trip(
    world: &mut AppWorld,
    destination: String,
    depart: String,
    ret: String,
) {
    assert!(
        validation::error_for_trip(&destination, &depart, &ret).is_none(),
        "trip input should validate"
    );
    let user_id = world.user().id;
    let id = queries::trips::create(
        &world.app_state().db,
        &destination,
        validation::parse_date(&depart),
        validation::parse_date(&ret),
        user_id,
    )
    .await
    .expect("create trip");
    world.trip_id = Some(id);
}

#[given(regex = r#"^a trip to \"([^\"]+)\"$"#)]
async fn given_trip(world: &mut AppWorld, destination: String) {
    let user_id = world.user().id;
    let id = queries::trips::create(&world.app_state().db, &destination, None, None, user_id)
        .await
        .expect("create trip");
    world.trip_id = Some(id);
}

#[when(regex = r"^I create (\d+) undated trips$")]
async fn when_create_many_trips(world: &mut AppWorld, count: i64) {
    let user_id = world.user().id;
    for n in 1..=count {
        queries::trips::create(
            &world.app_state().db,
            &format!("Destination {n}"),
            None,
            None,
            user_id,
        )
        .await
        .expect("create trip");
    }
}

#[then(regex = r"^my trip list reports (\d+) pages$")]
async fn then_trip_pages(world: &mut AppWorld, expected: i64) {
    let count = queries::trips::count_for_user(&world.app_state().db, world.user().id)
        .await
        .expect("count trips");
    assert_eq!(itinerary::total_pages(count, TRIPS_PER_PAGE), expected);
}

#[then(regex = r"^page (\d+) of my trip list has (\d+) trips$")]
async fn then_trip_page_len(world: &mut AppWorld, page: i64, expected: usize) {
    let trips = queries::trips::list_for_user(
        &world.app_state().db,
        world.user().id,
        TRIPS_PER_PAGE,
        (page - 1) * TRIPS_PER_PAGE,
    )
    .await
    .expect("list trips");
    assert_eq!(trips.len(), expected);
}

#[then(regex = r#"^the first listed trip is to \"([^\"]+)\"$"#)]
async fn then_first_trip(world: &mut AppWorld, destination: String) {
    let trips = queries::trips::list_for_user(&world.app_state().db, world.user().id, 1, 0)
        .await
        .expect("list trips");
    let first = trips.first().expect("at least one trip");
    assert_eq!(first.destination, destination);
}

#[when(regex = r"^I request trip (\d+)$")]
async fn when_request_trip(world: &mut AppWorld, trip_id: i64) {
    request_trip(world, trip_id).await;
}

#[given(regex = r#"^another user owns a trip to \"([^\"]+)\"$"#)]
async fn given_foreign_trip(world: &mut AppWorld, destination: String) {
    let other = auth::register_user(
        world.app_state(),
        "Somebody Else",
        "somebody.else@example.com",
        "their-password",
    )
    .await
    .expect("register other user");
    let id = queries::trips::create(&world.app_state().db, &destination, None, None, other.id)
        .await
        .expect("create foreign trip");
    world.foreign_trip_id = Some(id);
}

#[when("I request the other user's trip")]
async fn when_request_foreign_trip(world: &mut AppWorld) {
    let trip_id = world.foreign_trip_id.expect("foreign trip must exist");
    request_trip(world, trip_id).await;
}

#[then("I am sent back to the trip list with an error")]
async fn then_sent_to_trip_list(world: &mut AppWorld) {
    match world.last_denial.as_ref() {
        Some(AppError::Redirect(redirect)) => assert_eq!(redirect.location(), "/trips"),
        other => panic!("expected a guard redirect, got {other:?}"),
    }
}

#[when(
    regex = r#"^I add an activity \"([^\"]+)\" on \"([^\"]*)\" at \"([^\"]*)\" costing \"([^\"]*)\"$"#
)]
async fn when_add_activity(
    world: &mut AppWorld,
    title: String,
    date: String,
    time: String,
    cost: String,
) {
    let input = ActivityInput {
        title: title.clone(),
        date: date.clone(),
        time: time.clone(),
        cost: cost.clone(),
        note: String::new(),
    };
    assert!(
        validation::errors_for_activity(&input).is_empty(),
        "activity input should validate"
    );
    let trip_id = world.trip_id.expect("trip must exist");
    queries::activities::create(
        &world.app_state().db,
        trip_id,
        validation::parse_date(&date),
        validation::parse_time(&time),
        title.trim(),
        validation::parse_cost(&cost),
        None,
    )
    .await
    .expect("create activity");
}

#[when(regex = r#"^I add an undated activity \"([^\"]+)\"$"#)]
async fn when_add_undated_activity(world: &mut AppWorld, title: String) {
    let trip_id = world.trip_id.expect("trip must exist");
    queries::activities::create(&world.app_state().db, trip_id, None, None, &title, None, None)
        .await
        .expect("create activity");
}

#[then(regex = r"^the itinerary has (\d+) day groups$")]
async fn then_itinerary_groups(world: &mut AppWorld, expected: usize) {
    let groups = load_groups(world).await;
    assert_eq!(groups.len(), expected);
}

#[then("the first day group is the no-date bucket")]
async fn then_first_group_undated(world: &mut AppWorld) {
    let groups = load_groups(world).await;
    let first = groups.keys().next().expect("at least one group");
    assert!(first.is_none(), "expected the no-date bucket first");
}

#[when(regex = r#"^I clear the day \"([^\"]+)\"$"#)]
async fn when_clear_day(world: &mut AppWorld, day: String) {
    let trip_id = world.trip_id.expect("trip must exist");
    let date = validation::parse_date(&day).expect("well-formed day");
    queries::activities::delete_day(&world.app_state().db, trip_id, Some(date))
        .await
        .expect("delete day");
}

#[when(regex = r"^I request activity (\d+) in my trip$")]
async fn when_request_activity(world: &mut AppWorld, activity_id: i64) {
    let trip_id = world.trip_id.expect("trip must exist");
    let state = world.app_state();
    let flash = world.flash();
    let trip = guards::require_trip(&state.db, &flash, world.user(), trip_id)
        .await
        .expect("own trip resolves");
    let result = guards::require_activity(&state.db, &flash, &trip, activity_id).await;
    world.last_denial = result.err();
    assert!(world.last_denial.is_some(), "guard should have denied");
}

#[then("I am sent back to the itinerary with an error")]
async fn then_sent_to_itinerary(world: &mut AppWorld) {
    let trip_id = world.trip_id.expect("trip must exist");
    match world.last_denial.as_ref() {
        Some(AppError::Redirect(redirect)) => {
            assert_eq!(redirect.location(), format!("/trips/{trip_id}/itinerary"));
        }
        other => panic!("expected a guard redirect, got {other:?}"),
    }
}

async fn register_user(world: &mut AppWorld, full_name: String, email: String, password: String) {
    let created = auth::register_user(world.app_state(), &full_name, &email, &password)
        .await
        .expect("register user");
    world.current_user = Some(created);
}

async fn request_trip(world: &mut AppWorld, trip_id: i64) {
    let state = world.app_state();
    let flash = world.flash();
    match guards::require_trip(&state.db, &flash, world.user(), trip_id).await {
        Ok(trip) => {
            world.trip_id = Some(trip.id);
            world.last_denial = None;
        }
        Err(denial) => world.last_denial = Some(denial),
    }
}

async fn load_groups(
    world: &mut AppWorld,
) -> indexmap::IndexMap<itinerary::DayKey, Vec<wanderly::models::activity::Activity>> {
    let trip_id = world.trip_id.expect("trip must exist");
    let rows = queries::activities::itinerary_for_trip(&world.app_state().db, trip_id)
        .await
        .expect("load itinerary");
    group_by_date(rows)
}

#[tokio::main]
async fn main() {
    AppWorld::cucumber()
        .fail_on_skipped()
        .with_default_cli()
        .run("tests/features")
        .await;
}
