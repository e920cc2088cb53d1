use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::{channel::oneshot, executor::block_on};
use pretty_assertions::assert_eq;
use serde_json::json;
use waypoint_router::prelude::*;

type Route = ActiveRoute<&'static str>;

fn routes() -> Vec<RouteDefinition<&'static str>> {
    vec![
        RouteDefinition::new("/", "Home"),
        RouteDefinition::new("/about", "About").title("About us"),
        RouteDefinition::new("/login", "Login"),
        RouteDefinition::new("/admin", "Admin"),
        RouteDefinition::new("/blog/:id/:name", "Blog")
            .child(RouteDefinition::new("", "BlogIndex"))
            .child(RouteDefinition::new("comments", "Comments")),
        RouteDefinition::new("/docs", "Docs").child(RouteDefinition::new("(*)", "DocsMissing")),
        RouteDefinition::new("(*)", "NotFound"),
    ]
}

fn router(hash_mode: bool) -> (Router<&'static str>, Rc<MemoryHistory>) {
    let history = Rc::new(MemoryHistory::default());
    let router = Router::new(RouterConfig::default().history(history.clone()));
    let errors = block_on(router.set_routes(routes(), hash_mode));
    assert_eq!(errors, vec![]);
    (router, history)
}

fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn name(router: &Router<&'static str>) -> String {
    router.current().unwrap().name().to_string()
}

#[test]
fn loads_the_initial_location() {
    let history = Rc::new(MemoryHistory::with_initial_path("/blog/1/dan/comments"));
    let router = Router::new(RouterConfig::default().history(history.clone()));
    block_on(router.set_routes(routes(), false));

    assert_eq!(name(&router), "Comments");
    assert!(!history.can_go_back());
    assert_eq!(router.phase(), NavigationPhase::Idle);
}

#[test]
fn push_by_name_round_trips() {
    let (router, history) = router(false);

    let outcome = block_on(router.push(Descriptor::name("Blog").param("id", 1).param("name", "dan"))).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(history.location().path, "/blog/1/dan");
    assert_eq!(name(&router), "BlogIndex");

    let outcome = block_on(router.push("/blog/1/dan")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Unchanged));
}

#[test]
fn navigating_to_the_current_location_runs_nothing() {
    let (router, history) = router(false);
    block_on(router.push("/about?tab=team")).unwrap();

    let guard_calls = Rc::new(Cell::new(0));
    let calls = guard_calls.clone();
    router.before_each(move |_, _, _| calls.set(calls.get() + 1));

    let outcome = block_on(router.push("/ABOUT/?tab=team")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Unchanged));
    assert_eq!(guard_calls.get(), 0);

    let outcome = block_on(router.push("/about?tab=history")).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(guard_calls.get(), 1);
    assert_eq!(history.location().query.as_deref(), Some("tab=history"));
}

#[test]
fn default_child_inherits_params_and_query() {
    let (router, history) = router(false);
    block_on(router.push("/blog/1/dan?sortBy=date")).unwrap();

    let current = router.current().unwrap();
    assert_eq!(current.name(), "BlogIndex");
    assert_eq!(current.params(), &query(&[("id", "1"), ("name", "dan")]));
    assert_eq!(current.query(), &query(&[("sortBy", "date")]));
    assert_eq!(history.current_route(), "/blog/1/dan?sort-by=date");
}

#[test]
fn veto_changes_nothing() {
    let (router, history) = router(false);
    let after_calls = Rc::new(Cell::new(0));
    let calls = after_calls.clone();
    router.after_each(move |_, _, _| calls.set(calls.get() + 1));
    router.before_each(|to: &Route, _: Option<&Route>, _: &PropsSlot| to.name() != "Admin");

    let before = router.state();
    let outcome = block_on(router.push("/admin")).unwrap();

    assert!(matches!(outcome, NavigationOutcome::Vetoed));
    assert!(Rc::ptr_eq(&before, &router.state()));
    assert_eq!(history.location().path, "/");
    assert!(!history.can_go_back());
    assert_eq!(after_calls.get(), 0);
    assert_eq!(router.phase(), NavigationPhase::Idle);
}

#[test]
fn guards_see_both_routes() {
    let (router, _) = router(false);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let before = seen.clone();
    router.before_each(move |to: &Route, from: Option<&Route>, _: &PropsSlot| {
        before
            .borrow_mut()
            .push(format!("before {} <- {}", to.name(), from.map_or("none", |r| r.name())));
    });
    let after = seen.clone();
    router.after_each(move |to: &Route, from: Option<&Route>, _: Option<&serde_json::Value>| {
        after
            .borrow_mut()
            .push(format!("after {} <- {}", to.name(), from.map_or("none", |r| r.name())));
    });

    block_on(router.push("/about")).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec!["before About <- Home", "after About <- Home"]
    );
}

#[test]
fn query_merge_and_replace() {
    let (router, history) = router(false);
    block_on(router.push("/about")).unwrap();

    block_on(router.set_query(query(&[("a", "1")]), true, false)).unwrap();
    block_on(router.set_query(query(&[("b", "2")]), true, false)).unwrap();
    assert_eq!(router.current().unwrap().query(), &query(&[("a", "1"), ("b", "2")]));
    assert_eq!(history.location().query.as_deref(), Some("a=1&b=2"));

    block_on(router.set_query(query(&[("b", "2")]), false, true)).unwrap();
    assert_eq!(router.current().unwrap().query(), &query(&[("b", "2")]));
    assert_eq!(history.location().query.as_deref(), Some("b=2"));

    history.go_back();
    assert_eq!(history.location().query.as_deref(), Some("a=1"));
}

#[test]
fn missing_parameter_fails() {
    let (router, history) = router(false);

    let err = block_on(router.push(Descriptor::name("Blog").param("id", 1))).unwrap_err();

    assert!(matches!(
        err,
        NavigationError::Resolve(ResolveError::MissingParameter { ref param, .. }) if param == "name"
    ));
    assert_eq!(name(&router), "Home");
    assert_eq!(history.location().path, "/");
    assert_eq!(router.phase(), NavigationPhase::Idle);
}

#[test]
fn unknown_name_fails() {
    let (router, _) = router(false);

    let err = block_on(router.push("Nowhere")).unwrap_err();
    assert_eq!(
        err,
        NavigationError::Resolve(ResolveError::UnknownRoute {
            target: "Nowhere".to_string()
        })
    );
}

#[test]
fn wildcard_fallback() {
    let (router, history) = router(false);

    let outcome = block_on(router.push("/does/not/exist")).unwrap();
    assert!(outcome.route().unwrap().is_unknown());
    assert_eq!(name(&router), "NotFound");
    assert_eq!(router.current().unwrap().path(), "/does/not/exist");
    assert_eq!(history.location().path, "/does/not/exist");

    block_on(router.push("/docs/missing/page")).unwrap();
    assert_eq!(name(&router), "DocsMissing");
    assert!(router.current().unwrap().is_unknown());
    assert_eq!(router.chart().get(1).unwrap().name(), "Docs");

    let outcome = block_on(router.push("/docs/missing/page")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Unchanged));
}

#[test]
fn hash_mode_keeps_the_route_in_the_fragment() {
    let (router, history) = router(true);

    block_on(router.push(Descriptor::path("/blog/1/dan").query("pageSize", 20))).unwrap();

    let location = history.location();
    assert_eq!(location.path, "/");
    assert_eq!(location.hash.as_deref(), Some("/blog/1/dan?page-size=20"));
    assert_eq!(name(&router), "BlogIndex");

    let outcome = block_on(router.push("/blog/1/dan?page-size=20")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Unchanged));
}

#[test]
fn hash_mode_loads_from_the_fragment() {
    let history = Rc::new(MemoryHistory::with_initial_path("/#/blog/2/eve/comments?x=1"));
    let router = Router::new(RouterConfig::default().history(history));
    block_on(router.set_routes(routes(), true));

    let current = router.current().unwrap();
    assert_eq!(current.name(), "Comments");
    assert_eq!(current.param("name"), Some("eve"));
    assert_eq!(current.query(), &query(&[("x", "1")]));
}

#[test]
fn suspended_guard_waits_for_its_decision() {
    let (router, _) = router(false);
    let (tx, rx) = oneshot::channel::<bool>();
    let rx = RefCell::new(Some(rx));

    router.before_each(move |_, _, _| match rx.borrow_mut().take() {
        Some(rx) => GuardVerdict::pending(async move { rx.await.unwrap_or(false) }),
        None => GuardVerdict::Proceed,
    });

    let (outcome, ()) = block_on(async {
        futures::join!(router.push("/about"), async {
            assert_eq!(router.phase(), NavigationPhase::AwaitingBeforeGuard);
            assert_eq!(name(&router), "Home");
            tx.send(true).unwrap();
        })
    });

    assert!(outcome.unwrap().is_committed());
    assert_eq!(name(&router), "About");
}

#[test]
fn guard_can_redirect() {
    let (router, history) = router(false);

    let redirect = router.clone();
    router.before_each(move |to, _, _| {
        if to.name() != "Admin" {
            return GuardVerdict::Proceed;
        }
        let router = redirect.clone();
        GuardVerdict::pending(async move {
            router.push("/login").await.ok();
            false
        })
    });

    let outcome = block_on(router.push("/admin")).unwrap();

    assert!(matches!(outcome, NavigationOutcome::Vetoed));
    assert_eq!(name(&router), "Login");
    assert_eq!(history.location().path, "/login");
}

#[test]
fn back_and_forward_reload_without_writing_history() {
    let (router, history) = router(false);
    block_on(router.push("/about")).unwrap();
    block_on(router.push("/blog/1/dan")).unwrap();

    let froms = Rc::new(RefCell::new(Vec::new()));
    let seen = froms.clone();
    router.before_each(move |_, from: Option<&Route>, _| seen.borrow_mut().push(from.is_some()));

    block_on(router.go_back()).unwrap();
    assert_eq!(name(&router), "About");
    assert!(history.can_go_forward());

    block_on(router.go_forward()).unwrap();
    assert_eq!(name(&router), "BlogIndex");
    assert!(!history.can_go_forward());

    assert_eq!(*froms.borrow(), vec![false, false]);

    block_on(router.go_forward()).unwrap();
    assert_eq!(name(&router), "BlogIndex");
}

#[test]
fn foreign_navigation_is_picked_up_by_load() {
    let (router, history) = router(false);

    history.push("/about".to_string());
    assert_eq!(name(&router), "Home");

    block_on(router.load()).unwrap();
    assert_eq!(name(&router), "About");
}

#[test]
fn set_params() {
    let (router, history) = router(false);

    block_on(router.push("/about")).unwrap();
    let err = block_on(router.set_params(query(&[("id", "1")]), false)).unwrap_err();
    assert_eq!(
        err,
        NavigationError::Resolve(ResolveError::NoParameters {
            route: "About".to_string()
        })
    );

    block_on(router.push("/blog/1/dan/comments?page=2")).unwrap();
    block_on(router.set_params(query(&[("name", "eve")]), false)).unwrap();
    assert_eq!(history.current_route(), "/blog/1/eve/comments?page=2");
    assert_eq!(name(&router), "Comments");
}

#[test]
fn set_params_needs_an_active_route() {
    let history = Rc::new(MemoryHistory::default());
    let router = Router::new(RouterConfig::default().history(history));
    block_on(router.set_routes(vec![RouteDefinition::new("/about", "About")], false));
    assert!(router.current().is_none());

    let err = block_on(router.set_params(query(&[("id", "1")]), false)).unwrap_err();
    assert_eq!(err, NavigationError::Resolve(ResolveError::NoActiveRoute));

    let err = block_on(router.set_query(query(&[("a", "1")]), true, false)).unwrap_err();
    assert_eq!(err, NavigationError::Resolve(ResolveError::NoActiveRoute));
}

#[test]
fn navigation_before_routes_fails() {
    let router = Router::<&'static str>::default();

    let err = block_on(router.push("/")).unwrap_err();
    assert_eq!(err, NavigationError::NoRoutes);
    assert!(router.routes().is_none());
}

#[test]
fn title_is_set() {
    let (router, history) = router(false);
    assert_eq!(history.title(), None);

    block_on(router.push("About")).unwrap();
    assert_eq!(history.title().as_deref(), Some("About us"));
}

#[test]
fn props_flow_through_the_guards() {
    let (router, _) = router(false);
    let received = Rc::new(RefCell::new(None));

    router.before_each(|to: &Route, _: Option<&Route>, props: &PropsSlot| {
        let from_intent = to.props().cloned().unwrap_or_default();
        props.set(json!({ "intent": from_intent, "guard": true }));
    });
    let after = received.clone();
    router.after_each(move |_, _, props: Option<&serde_json::Value>| {
        *after.borrow_mut() = props.cloned();
    });

    block_on(router.push(Descriptor::name("About").props(json!("hello")))).unwrap();

    let expected = json!({ "intent": "hello", "guard": true });
    assert_eq!(router.props(), Some(expected.clone()));
    assert_eq!(*received.borrow(), Some(expected));
}

#[test]
fn subscribers_see_each_commit() {
    let (router, _) = router(false);
    router.before_each(|to: &Route, _: Option<&Route>, _: &PropsSlot| to.name() != "Admin");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let listener = seen.clone();
    router.subscribe(move |state| {
        let names: Vec<_> = state.chart().iter().map(|(_, route)| route.name().to_string()).collect();
        listener.borrow_mut().push(names.join(" > "));
    });

    block_on(router.push("/about")).unwrap();
    block_on(router.push("/admin")).unwrap();
    block_on(router.push("/blog/1/dan/comments")).unwrap();
    block_on(router.push("/blog/1/dan/comments")).unwrap();

    assert_eq!(*seen.borrow(), vec!["About", "Blog > Comments"]);
}

#[test]
fn is_at_checks_the_chart() {
    let (router, _) = router(false);
    block_on(router.push("/blog/1/dan/comments")).unwrap();

    let state = router.state();
    assert!(state.is_at("Comments", true));
    assert!(state.is_at("Blog", false));
    assert!(!state.is_at("Blog", true));
    assert!(!state.is_at("About", false));
}

#[test]
fn href_does_not_navigate() {
    let (router, history) = router(false);

    let href = router
        .href(Descriptor::name("Comments").param("id", 7).param("name", "a b"))
        .unwrap();

    assert_eq!(href, "/blog/7/a%20b/comments");
    assert_eq!(history.location().path, "/");
    assert_eq!(name(&router), "Home");
}

#[test]
fn encoded_params_round_trip() {
    let (router, history) = router(false);

    block_on(router.push(Descriptor::name("Blog").param("id", 1).param("name", "dan smith"))).unwrap();
    assert_eq!(history.location().path, "/blog/1/dan%20smith");
    assert_eq!(router.current().unwrap().param("name"), Some("dan smith"));

    let outcome = block_on(router.push("/blog/1/dan%20smith")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Unchanged));
}

#[test]
fn set_routes_reports_problems() {
    let router = Router::<&'static str>::default();

    let errors = block_on(router.set_routes(
        vec![
            RouteDefinition::new("/", "Home"),
            RouteDefinition::new("/a", "Page").name("page"),
            RouteDefinition::new("/b", "Other").name("page"),
        ],
        false,
    ));

    assert_eq!(
        errors,
        vec![TreeError::DuplicateName {
            name: "page".to_string()
        }]
    );
    assert_eq!(name(&router), "Home");
}

#[test]
fn strict_mode_excludes_invalid_routes() {
    let history = Rc::new(MemoryHistory::default());
    let router = Router::new(RouterConfig::default().strict(true).history(history));

    let errors = block_on(router.set_routes(
        vec![
            RouteDefinition::new("/", "Home"),
            RouteDefinition::new("/a/:x/:x", "Broken"),
            RouteDefinition::new("(*)", "NotFound"),
        ],
        false,
    ));

    assert_eq!(errors.len(), 1);
    let err = block_on(router.push("Broken")).unwrap_err();
    assert!(matches!(err, NavigationError::Resolve(ResolveError::UnknownRoute { .. })));

    block_on(router.push("/a/1/2")).unwrap();
    assert_eq!(name(&router), "NotFound");
}

#[test]
fn guards_can_tell_an_unknown_path_from_the_wildcard_route() {
    let (router, _) = router(false);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let unknown = seen.clone();
    router.before_each(move |to: &Route, _: Option<&Route>, _: &PropsSlot| {
        unknown.borrow_mut().push((to.name().to_string(), to.is_unknown()));
        !to.is_unknown()
    });

    let outcome = block_on(router.push("/no/such/page")).unwrap();
    assert!(matches!(outcome, NavigationOutcome::Vetoed));
    assert_eq!(name(&router), "Home");

    block_on(router.push("/about")).unwrap();
    assert!(!router.current().unwrap().is_unknown());

    assert_eq!(
        *seen.borrow(),
        vec![("NotFound".to_string(), true), ("About".to_string(), false)]
    );
}

#[test]
fn path_with_params_reaches_the_nested_route() {
    let history = Rc::new(MemoryHistory::default());
    let router = Router::new(RouterConfig::default().history(history.clone()));
    block_on(router.set_routes(
        vec![
            RouteDefinition::new("/", "Home"),
            RouteDefinition::new("/blog/:id", "Blog").child(RouteDefinition::new(":name", "Post")),
        ],
        false,
    ));

    block_on(router.push(Descriptor::path("/blog").param("id", "1").param("name", "dan"))).unwrap();

    assert_eq!(name(&router), "Post");
    assert_eq!(history.location().path, "/blog/1/dan");
    assert_eq!(router.current().unwrap().params(), &query(&[("id", "1"), ("name", "dan")]));
}

#[test]
fn query_keys_with_digits_survive_a_reload() {
    let (router, history) = router(false);

    block_on(router.push(
        Descriptor::path("/about")
            .query("v2", "x")
            .query("utm_source", "y")
            .query("page2Size", "10"),
    ))
    .unwrap();
    assert_eq!(
        history.location().query.as_deref(),
        Some("page2-size=10&utm-source=y&v2=x")
    );

    block_on(router.push("/login")).unwrap();
    block_on(router.go_back()).unwrap();
    assert_eq!(
        router.current().unwrap().query(),
        &query(&[("page2-size", "10"), ("utm-source", "y"), ("v2", "x")])
    );
}

/// Holds the navigation to `About` until the returned sender decides, lets everything else through.
fn hold_about(router: &Router<&'static str>) -> oneshot::Sender<bool> {
    let (tx, rx) = oneshot::channel::<bool>();
    let rx = RefCell::new(Some(rx));
    router.before_each(move |to, _, _| {
        if to.name() != "About" {
            return GuardVerdict::Proceed;
        }
        match rx.borrow_mut().take() {
            Some(rx) => GuardVerdict::pending(async move { rx.await.unwrap_or(false) }),
            None => GuardVerdict::Proceed,
        }
    });
    tx
}

#[test]
fn overlapping_navigations_race_and_the_last_commit_wins() {
    let (router, history) = router(false);
    let tx = hold_about(&router);

    let (slow, ()) = block_on(async {
        futures::join!(router.push("/about"), async {
            assert_eq!(router.phase(), NavigationPhase::AwaitingBeforeGuard);

            let fast = router.push("/login").await.unwrap();
            assert!(fast.is_committed());
            assert_eq!(name(&router), "Login");
            assert_eq!(history.location().path, "/login");

            tx.send(true).unwrap();
        })
    });

    assert!(slow.unwrap().is_committed());
    assert_eq!(name(&router), "About");
    assert_eq!(history.location().path, "/about");

    history.go_back();
    assert_eq!(history.location().path, "/login");
    history.go_back();
    assert_eq!(history.location().path, "/");
}

#[test]
fn overlapping_navigation_vetoed_late_keeps_the_earlier_commit() {
    let (router, history) = router(false);
    let tx = hold_about(&router);

    let (slow, ()) = block_on(async {
        futures::join!(router.push("/about"), async {
            router.push("/login").await.unwrap();
            tx.send(false).unwrap();
        })
    });

    assert!(matches!(slow.unwrap(), NavigationOutcome::Vetoed));
    assert_eq!(name(&router), "Login");
    assert_eq!(history.location().path, "/login");
    assert_eq!(router.phase(), NavigationPhase::Idle);
}
