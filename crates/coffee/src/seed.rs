use crate::coffee::NewCoffee;

/// The starter menu loaded into an empty store.
pub fn sample_coffees() -> Vec<NewCoffee> {
    vec![
        NewCoffee::new("Espresso", Some("Strong and bold shot of pure coffee."), 2.5),
        NewCoffee::new("Latte", Some("Espresso with steamed milk and a layer of foam."), 2.5),
        NewCoffee::new("Cappuccino", Some("Rich espresso with frothy milk foam."), 2.5),
        NewCoffee::new("Cold Brew", Some("Smooth, cold-steeped coffee over ice."), 2.5),
    ]
}
