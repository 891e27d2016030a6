//! Markup for each storefront screen.

use super::dom::Node;
use super::store::{product, Action, Product, Screen, Session, CATALOGUE};

/// Render the session's current screen
pub fn render(session: &Session) -> Node {
    let body = Node::new("body");
    match session.screen() {
        Screen::Blank => body,
        Screen::Login => body.child(login(session)),
        Screen::Inventory => body.child(shell(session, "Products", inventory(session))),
        Screen::Item(id) => body.child(shell(session, "", item(session, id))),
        Screen::Cart => body.child(shell(session, "Your Cart", cart(session))),
    }
}

fn login(session: &Session) -> Node {
    let mut form = Node::new("form").children([
        Node::new("div").class("form_group").child(
            Node::new("input")
                .id("user-name")
                .class("input_error form_input")
                .test_id("username")
                .attr("type", "text")
                .attr("placeholder", "Username")
                .attr("value", session.field("user-name")),
        ),
        Node::new("div").class("form_group").child(
            Node::new("input")
                .id("password")
                .class("input_error form_input")
                .test_id("password")
                .attr("type", "password")
                .attr("placeholder", "Password")
                .attr("value", session.field("password")),
        ),
    ]);
    if let Some(error) = session.error() {
        form = form.child(
            Node::new("div").class("error-message-container error").child(
                Node::new("h3").test_id("error").text(error).child(
                    Node::new("button")
                        .class("error-button")
                        .test_id("error-button")
                        .attr("aria-label", "Dismiss error")
                        .on_click(Action::DismissError),
                ),
            ),
        );
    }
    form = form.child(
        Node::new("input")
            .id("login-button")
            .class("submit-button btn_action")
            .test_id("login-button")
            .attr("type", "submit")
            .attr("value", "Login")
            .on_click(Action::Login),
    );

    Node::new("div").class("login_container").children([
        Node::new("div").class("login_logo").text("Swag Labs"),
        Node::new("div").class("login_wrapper").children([
            Node::new("div").class("login-box").child(form),
            Node::new("div")
                .class("login_credentials")
                .test_id("login-credentials")
                .text("Accepted usernames are: standard_user problem_user performance_glitch_user error_user visual_user"),
            Node::new("div")
                .class("login_password")
                .test_id("login-password")
                .text("Password for all users: secret_sauce"),
        ]),
    ])
}

fn menu(open: bool) -> Node {
    let entry = |id: &str, label: &str, action: Action| {
        Node::new("a")
            .id(id)
            .class("bm-item menu-item")
            .test_id(id.replace('_', "-"))
            .attr("href", "#")
            .text(label)
            .on_click(action)
    };
    Node::new("div")
        .class("bm-menu-wrap")
        .hidden_if(!open)
        .children([
            Node::new("nav").class("bm-item-list").children([
                entry("inventory_sidebar_link", "All Items", Action::AllItems),
                Node::new("a")
                    .id("about_sidebar_link")
                    .class("bm-item menu-item")
                    .test_id("about-sidebar-link")
                    .attr("href", "https://saucelabs.com/")
                    .text("About"),
                entry("logout_sidebar_link", "Logout", Action::Logout),
                entry("reset_sidebar_link", "Reset App State", Action::ResetAppState),
            ]),
            Node::new("button")
                .id("react-burger-cross-btn")
                .text("Close Menu")
                .on_click(Action::CloseMenu),
        ])
}

fn shell(session: &Session, title: &str, content: Node) -> Node {
    let mut cart_link = Node::new("a")
        .class("shopping_cart_link")
        .test_id("shopping-cart-link")
        .on_click(Action::OpenCart);
    if !session.cart().is_empty() {
        cart_link = cart_link.child(
            Node::new("span")
                .class("shopping_cart_badge")
                .test_id("shopping-cart-badge")
                .text(session.cart().len().to_string()),
        );
    }

    let header = Node::new("div")
        .class("primary_header")
        .test_id("primary-header")
        .children([
            Node::new("div").class("bm-burger-button").child(
                Node::new("button")
                    .id("react-burger-menu-btn")
                    .text("Open Menu")
                    .on_click(Action::OpenMenu),
            ),
            menu(session.menu_open()),
            Node::new("div").class("app_logo").text("Swag Labs"),
            Node::new("div").id("shopping_cart_container").child(cart_link),
        ]);
    let mut secondary = Node::new("div")
        .class("header_secondary_container")
        .test_id("secondary-header");
    if !title.is_empty() {
        secondary = secondary.child(Node::new("span").class("title").test_id("title").text(title));
    }

    let social = |class: &str, href: &str, label: &str| {
        Node::new("li")
            .class(class)
            .child(Node::new("a").attr("href", href).text(label))
    };
    let footer = Node::new("footer").class("footer").test_id("footer").children([
        Node::new("ul").class("social").children([
            social("social_twitter", "https://twitter.com/saucelabs", "Twitter"),
            social("social_facebook", "https://www.facebook.com/saucelabs", "Facebook"),
            social("social_linkedin", "https://www.linkedin.com/company/sauce-labs/", "LinkedIn"),
        ]),
        Node::new("div")
            .class("footer_copy")
            .test_id("footer-copy")
            .text("Sauce Labs. All Rights Reserved. Terms of Service | Privacy Policy"),
    ]);

    Node::new("div").id("page_wrapper").class("page_wrapper").children([
        Node::new("div").id("header_container").class("header_container").children([header, secondary]),
        Node::new("div").id("contents_wrapper").child(content),
        footer,
    ])
}

fn cart_button(session: &Session, p: &Product, add_id: String, remove_id: String) -> Node {
    if session.in_cart(p.id) {
        Node::new("button")
            .id(remove_id.clone())
            .class("btn btn_secondary btn_small btn_inventory")
            .test_id(remove_id)
            .text("Remove")
            .on_click(Action::RemoveFromCart(p.id))
    } else {
        Node::new("button")
            .id(add_id.clone())
            .class("btn btn_primary btn_small btn_inventory")
            .test_id(add_id)
            .text("Add to cart")
            .on_click(Action::AddToCart(p.id))
    }
}

fn title_link(p: &Product, test_id: &str) -> Node {
    Node::new("a")
        .id(format!("item_{}_title_link", p.id))
        .test_id(format!("item-{}-title-link", p.id))
        .attr("href", "#")
        .on_click(Action::OpenItem(p.id))
        .child(Node::new("div").class("inventory_item_name").test_id(test_id).text(p.name))
}

fn inventory(session: &Session) -> Node {
    let cards = CATALOGUE.iter().map(|p| {
        Node::new("div")
            .class("inventory_item")
            .test_id("inventory-item")
            .children([
                Node::new("div").class("inventory_item_img").child(
                    Node::new("a")
                        .id(format!("item_{}_img_link", p.id))
                        .attr("href", "#")
                        .on_click(Action::OpenItem(p.id))
                        .child(
                            Node::new("img")
                                .class("inventory_item_img")
                                .attr("alt", p.name)
                                .attr("src", format!("/static/media/{}.jpg", p.slug())),
                        ),
                ),
                Node::new("div").class("inventory_item_description").children([
                    Node::new("div").class("inventory_item_label").children([
                        title_link(p, "inventory-item-name"),
                        Node::new("div")
                            .class("inventory_item_desc")
                            .test_id("inventory-item-desc")
                            .text(p.description),
                    ]),
                    Node::new("div").class("pricebar").children([
                        Node::new("div")
                            .class("inventory_item_price")
                            .test_id("inventory-item-price")
                            .text(p.display_price()),
                        cart_button(
                            session,
                            p,
                            format!("add-to-cart-{}", p.slug()),
                            format!("remove-{}", p.slug()),
                        ),
                    ]),
                ]),
            ])
    });
    Node::new("div")
        .id("inventory_container")
        .class("inventory_container")
        .child(Node::new("div").class("inventory_list").test_id("inventory-list").children(cards))
}

fn item(session: &Session, id: u32) -> Node {
    let back = Node::new("button")
        .id("back-to-products")
        .class("btn btn_secondary back btn_large inventory_details_back_button")
        .test_id("back-to-products")
        .text("Back to products")
        .on_click(Action::BackToProducts);
    let details = match product(id) {
        Some(p) => Node::new("div").class("inventory_details_desc_container").children([
            Node::new("div")
                .class("inventory_details_name large_size")
                .test_id("inventory-item-name")
                .text(p.name),
            Node::new("div")
                .class("inventory_details_desc large_size")
                .test_id("inventory-item-desc")
                .text(p.description),
            Node::new("div")
                .class("inventory_details_price")
                .test_id("inventory-item-price")
                .text(p.display_price()),
            cart_button(session, p, "add-to-cart".to_string(), "remove".to_string()),
        ]),
        None => Node::new("div")
            .class("inventory_details_desc_container")
            .child(
                Node::new("div")
                    .class("inventory_details_name large_size")
                    .test_id("inventory-item-name")
                    .text("ITEM NOT FOUND"),
            ),
    };
    Node::new("div").id("inventory_item_container").class("inventory_item_container").children([
        back,
        Node::new("div").class("inventory_details").child(details),
    ])
}

fn cart(session: &Session) -> Node {
    let rows = session.cart().iter().filter_map(|id| product(*id)).map(|p| {
        Node::new("div")
            .class("cart_item")
            .test_id("inventory-item")
            .children([
                Node::new("div").class("cart_quantity").test_id("item-quantity").text("1"),
                Node::new("div").class("cart_item_label").children([
                    title_link(p, "inventory-item-name"),
                    Node::new("div")
                        .class("inventory_item_desc")
                        .test_id("inventory-item-desc")
                        .text(p.description),
                    Node::new("div").class("item_pricebar").child(
                        Node::new("div")
                            .class("inventory_item_price")
                            .test_id("inventory-item-price")
                            .text(p.display_price()),
                    ),
                    Node::new("button")
                        .id(format!("remove-{}", p.slug()))
                        .class("btn btn_secondary btn_small cart_button")
                        .test_id(format!("remove-{}", p.slug()))
                        .text("Remove")
                        .on_click(Action::RemoveFromCart(p.id)),
                ]),
            ])
    });
    Node::new("div").id("cart_contents_container").children([
        Node::new("div").class("cart_list").test_id("cart-list").children(rows),
        Node::new("div").class("cart_footer").children([
            Node::new("button")
                .id("continue-shopping")
                .class("btn btn_secondary back btn_medium")
                .test_id("continue-shopping")
                .text("Continue Shopping")
                .on_click(Action::ContinueShopping),
            Node::new("button")
                .id("checkout")
                .class("btn btn_action btn_medium checkout_button")
                .test_id("checkout")
                .text("Checkout"),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_site::dom::Dom;
    use crate::locator::{AriaRole, Selector, Step};
    use std::time::Instant;

    fn count(dom: &Dom, selector: Selector) -> usize {
        dom.query(&[Step::new(selector)]).unwrap().len()
    }

    fn logged_in() -> Session {
        let mut session = Session::new();
        let _ = session.goto("https://www.saucedemo.com/");
        session.fill("user-name", "standard_user");
        session.fill("password", "secret_sauce");
        session.apply(Action::Login, Instant::now());
        session
    }

    mod login_tests {
        use super::*;

        #[test]
        fn test_login_form() {
            let mut session = Session::new();
            let _ = session.goto("https://www.saucedemo.com/");
            let dom = Dom::build(render(&session));
            assert_eq!(count(&dom, Selector::css("input")), 3);
            assert_eq!(count(&dom, Selector::role_named(AriaRole::Button, "LOGIN")), 1);
            assert_eq!(count(&dom, Selector::role_named(AriaRole::Textbox, "Username")), 1);
            assert_eq!(count(&dom, Selector::role_named(AriaRole::Textbox, "Password")), 1);
            assert_eq!(count(&dom, Selector::test_id("error")), 0);
        }

        #[test]
        fn test_error_banner() {
            let mut session = Session::new();
            let _ = session.goto("https://www.saucedemo.com/");
            session.apply(Action::Login, Instant::now());
            let dom = Dom::build(render(&session));
            let found = dom.query(&[Step::new(Selector::test_id("error"))]).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(dom.text(found[0]), "Epic sadface: Username is required");
        }
    }

    mod shell_tests {
        use super::*;

        #[test]
        fn test_menu_hidden_until_opened() {
            let mut session = logged_in();
            let logout = Selector::role_named(AriaRole::Link, "Logout");
            assert_eq!(count(&Dom::build(render(&session)), logout.clone()), 0);
            session.apply(Action::OpenMenu, Instant::now());
            assert_eq!(count(&Dom::build(render(&session)), logout), 1);
        }

        #[test]
        fn test_inventory_cards() {
            let session = logged_in();
            let dom = Dom::build(render(&session));
            assert_eq!(count(&dom, Selector::css(".inventory_item")), CATALOGUE.len());
            assert_eq!(count(&dom, Selector::test_id("primary-header")), 1);
            assert_eq!(count(&dom, Selector::test_id("shopping-cart-badge")), 0);
        }

        #[test]
        fn test_cart_rows_and_badge() {
            let mut session = logged_in();
            session.apply(Action::AddToCart(4), Instant::now());
            session.apply(Action::OpenCart, Instant::now());
            let dom = Dom::build(render(&session));
            let rows = dom
                .query(&[Step::new(Selector::css(r#"[data-test="inventory-item"]"#))])
                .unwrap();
            assert_eq!(rows.len(), 1);
            assert!(dom.text(rows[0]).contains("Sauce Labs Backpack"));
            assert!(dom.text(rows[0]).contains("29.99"));
            assert_eq!(count(&dom, Selector::test_id("shopping-cart-badge")), 1);
        }

        #[test]
        fn test_unknown_item() {
            let mut session = logged_in();
            session.apply(Action::OpenItem(99), Instant::now());
            let dom = Dom::build(render(&session));
            assert_eq!(count(&dom, Selector::text("ITEM NOT FOUND")), 1);
            assert_eq!(count(&dom, Selector::role_named(AriaRole::Button, "Add to cart")), 0);
        }
    }
}
