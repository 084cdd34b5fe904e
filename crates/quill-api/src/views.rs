//! Server-rendered HTML. Every piece of user-supplied text goes through [`escape`].

use std::fmt::Write;

use axum::response::Html;

use quill_types::forms::{FeedbackForm, FieldErrors, LoginForm, RegisterForm};
use quill_types::models::{Feedback, User};

use crate::flash::FlashMessage;

pub fn profile_path(username: &str) -> String {
    format!("/users/{}", urlencoding::encode(username))
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, viewer: Option<&str>, flashes: &[FlashMessage], body: &str) -> Html<String> {
    let mut nav = String::new();
    match viewer {
        Some(username) => {
            let _ = write!(
                nav,
                r#"<a href="{}">{}</a> <form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#,
                escape(&profile_path(username)),
                escape(username),
            );
        }
        None => nav.push_str(r#"<a href="/register">Register</a> <a href="/login">Log in</a>"#),
    }

    let mut messages = String::new();
    for flash in flashes {
        let _ = write!(
            messages,
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message),
        );
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} · Quill</title></head>
<body>
<nav>{nav}</nav>
{messages}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    ))
}

fn field_errors(errors: &FieldErrors, name: &str) -> String {
    errors
        .get(name)
        .iter()
        .map(|e| format!(r#"<small class="error">{}</small>"#, escape(e)))
        .collect()
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label> <input id="{name}" name="{name}" type="{kind}" value="{value}"> {errors}</p>"#,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

fn textarea(label: &str, name: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        r#"<p><label for="{name}">{label}</label> <textarea id="{name}" name="{name}">{value}</textarea> {errors}</p>"#,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

pub fn register_page(flashes: &[FlashMessage], form: &RegisterForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/register">{}{}{}{}{}<button type="submit">Register</button></form>"#,
        input("Username", "username", "text", &form.username, errors),
        // Passwords are never echoed back.
        input("Password", "password", "password", "", errors),
        input("Email", "email", "email", &form.email, errors),
        input("First Name", "first_name", "text", &form.first_name, errors),
        input("Last Name", "last_name", "text", &form.last_name, errors),
    );
    layout("Register", None, flashes, &body)
}

pub fn login_page(flashes: &[FlashMessage], form: &LoginForm, errors: &FieldErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/login">{}{}<button type="submit">Log in</button></form>"#,
        input("Username", "username", "text", &form.username, errors),
        input("Password", "password", "password", "", errors),
    );
    layout("Log in", None, flashes, &body)
}

pub fn profile_page(flashes: &[FlashMessage], viewer: &str, user: &User, posts: &[Feedback]) -> Html<String> {
    let own = viewer == user.username;
    let path = escape(&profile_path(&user.username));

    let mut body = format!(
        r#"<section class="profile"><p>Username: {}</p><p>Name: {}</p><p>Email: {}</p></section>"#,
        escape(&user.username),
        escape(&user.full_name()),
        escape(&user.email),
    );

    body.push_str("<h2>Feedback</h2>");
    if posts.is_empty() {
        body.push_str("<p>No feedback yet.</p>");
    }
    body.push_str("<ul class=\"posts\">");
    for post in posts {
        let _ = write!(
            body,
            r#"<li><h3>{}</h3><p>{}</p>"#,
            escape(&post.title),
            escape(&post.content),
        );
        if own {
            let _ = write!(
                body,
                r#"<a href="/feedback/{id}/update">Edit</a> <form method="post" action="/feedback/{id}/delete" class="inline"><button type="submit">Delete</button></form>"#,
                id = post.id,
            );
        }
        body.push_str("</li>");
    }
    body.push_str("</ul>");

    if own {
        let _ = write!(
            body,
            r#"<p><a href="{path}/feedback/add">Add feedback</a></p><form method="post" action="{path}/delete"><button type="submit">Delete profile</button></form>"#,
        );
    }

    layout(&user.username, Some(viewer), flashes, &body)
}

pub fn add_feedback_page(
    flashes: &[FlashMessage],
    username: &str,
    form: &FeedbackForm,
    errors: &FieldErrors,
) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="{}/feedback/add">{}{}<button type="submit">Add</button></form>"#,
        escape(&profile_path(username)),
        input("Title", "title", "text", &form.title, errors),
        textarea("Content", "content", &form.content, errors),
    );
    layout("Add feedback", Some(username), flashes, &body)
}

pub fn edit_feedback_page(
    flashes: &[FlashMessage],
    post: &Feedback,
    form: &FeedbackForm,
    errors: &FieldErrors,
) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/feedback/{}/update">{}{}<button type="submit">Save</button></form><p><a href="{}">Cancel</a></p>"#,
        post.id,
        input("Title", "title", "text", &form.title, errors),
        textarea("Content", "content", &form.content, errors),
        escape(&profile_path(&post.username)),
    );
    layout("Edit feedback", Some(&post.username), flashes, &body)
}

pub fn not_found() -> Html<String> {
    layout("Not found", None, &[], "<p>The page you asked for does not exist.</p>")
}

pub fn server_error() -> Html<String> {
    layout("Something went wrong", None, &[], "<p>Please try again later.</p>")
}
