#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(String, String)>, String)| {
    let mut registry = slotmatch::Registry::new();

    for (i, (path, constraint)) in data.0.into_iter().enumerate() {
        let route = match slotmatch::Route::new(format!("r{i}"), path) {
            Ok(route) => route,
            Err(_) => return,
        };

        let first = route.pattern().wildcards().first().map(|w| w.name().to_owned());
        let route = match first {
            Some(name) => match route.constraint(&name, &constraint) {
                Ok(route) => route,
                Err(_) => return,
            },
            None => route,
        };

        if registry.register(route.get(i).unwrap()).is_err() {
            return;
        }
    }

    let router = registry.freeze();
    let first = router.at(&data.1).map(|m| m.route.id());
    let second = router.at(&data.1).map(|m| m.route.id());
    assert_eq!(first, second);

    let json = router.to_json().unwrap();
    let restored = slotmatch::Router::<usize>::from_json(&json).unwrap();
    assert_eq!(restored.at(&data.1).map(|m| m.route.id()), first);
});
