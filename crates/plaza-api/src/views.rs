//! Server-rendered pages. No template engine: each page is a `render_*`
//! function building markup through `html_escape`, so nothing user-authored
//! reaches the browser unescaped. The one exception is chat message content,
//! which the text processor already rendered and escaped at write time.

use chrono::{DateTime, Utc};

use plaza_store::SUPER_ADMIN;
use plaza_types::models::{ChatMessage, NewsItem, Poll, Profile, User};

use crate::middleware::Claims;
use crate::textproc::html_escape;

fn fmt_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn layout(title: &str, session: Option<&Claims>, notice: Option<&str>, body: &str) -> String {
    let nav = match session {
        Some(claims) => {
            let admin_link = if claims.admin {
                " | <a href=\"/admin\">Admin</a>"
            } else {
                ""
            };
            format!(
                "<nav><a href=\"/\">Home</a> | <a href=\"/news\">News</a> | \
                 <a href=\"/chat\">Chat</a> | <a href=\"/polls\">Polls</a> | \
                 <a href=\"/account\">Account</a>{admin_link} | \
                 <a href=\"/logout\">Logout ({user})</a></nav><hr>",
                user = html_escape(&claims.sub),
            )
        }
        None => String::new(),
    };

    let notice = notice
        .map(|n| format!("<p class=\"notice\"><em>{}</em></p>", html_escape(n)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} | plaza</title></head>\n\
         <body>\n{nav}{notice}{body}\n</body>\n</html>\n",
        title = html_escape(title),
    )
}

pub fn render_login(error: Option<&str>) -> String {
    let body = "<h1>Log in</h1>\
<form method=\"post\" action=\"/login\">\
  <label>Username: <input name=\"username\" required></label><br>\
  <label>Password: <input name=\"password\" type=\"password\" required></label><br>\
  <button type=\"submit\">Log in</button>\
</form>";
    layout("Log in", None, error, body)
}

pub fn render_index(claims: &Claims, news: &[NewsItem], notice: Option<&str>) -> String {
    let mut body = format!("<h1>Welcome, {}</h1><h2>Latest news</h2>", html_escape(&claims.sub));
    body.push_str(&news_list(news, claims));
    layout("Home", Some(claims), notice, &body)
}

pub fn render_news(claims: &Claims, news: &[NewsItem], notice: Option<&str>) -> String {
    let mut body = String::from(
        "<h1>News</h1>\
<form method=\"post\" action=\"/news\">\
  <input type=\"hidden\" name=\"action\" value=\"add_news\">\
  <label>Title: <input name=\"title\" required></label><br>\
  <label>Content:<br><textarea name=\"content\" rows=\"4\" cols=\"48\" required></textarea></label><br>\
  <button type=\"submit\">Publish</button>\
</form><hr>",
    );
    body.push_str(&news_list(news, claims));
    layout("News", Some(claims), notice, &body)
}

fn news_list(news: &[NewsItem], claims: &Claims) -> String {
    if news.is_empty() {
        return "<p>No news yet.</p>".to_string();
    }

    let mut s = String::new();
    for item in news.iter().rev() {
        let delete = if claims.sub == SUPER_ADMIN || item.author == claims.sub {
            format!(
                "<form method=\"post\" action=\"/news\">\
                 <input type=\"hidden\" name=\"action\" value=\"delete_news\">\
                 <input type=\"hidden\" name=\"news_id\" value=\"{}\">\
                 <button type=\"submit\">Delete</button></form>",
                item.id
            )
        } else {
            String::new()
        };
        s.push_str(&format!(
            "<article><h3>{title}</h3><p>{content}</p>\
             <small>by <a href=\"/user/{author}\">{author}</a> at {date}</small>{delete}</article>",
            title = html_escape(&item.title),
            content = html_escape(&item.content),
            author = html_escape(&item.author),
            date = fmt_time(&item.created_at),
        ));
    }
    s
}

pub fn render_chat(claims: &Claims, messages: &[ChatMessage], notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Chat</h1><div class=\"messages\">");
    for msg in messages {
        // Content is pre-rendered, escaped markup from the text processor.
        body.push_str(&format!(
            "<p><strong><a href=\"/user/{author}\">{author}</a></strong> \
             <small>{date}</small><br>{content}</p>",
            author = html_escape(&msg.author),
            date = fmt_time(&msg.created_at),
            content = msg.content,
        ));
    }
    body.push_str(
        "</div><hr>\
<form method=\"post\" action=\"/chat\">\
  <input name=\"message\" size=\"60\" placeholder=\"Say something: @name mentions, #tags\">\
  <button type=\"submit\">Send</button>\
</form>\
<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
  <label>Share a file: <input type=\"file\" name=\"file\"></label>\
  <button type=\"submit\">Upload</button>\
</form>",
    );
    layout("Chat", Some(claims), notice, &body)
}

pub fn render_polls(claims: &Claims, polls: &[Poll], notice: Option<&str>) -> String {
    let mut body = String::from(
        "<h1>Polls</h1>\
<form method=\"post\" action=\"/polls\">\
  <input type=\"hidden\" name=\"action\" value=\"create_poll\">\
  <label>New poll: <input name=\"poll_name\" required></label>\
  <button type=\"submit\">Create</button>\
</form><hr>",
    );

    if polls.is_empty() {
        body.push_str("<p>No polls yet.</p>");
    }
    for poll in polls {
        let voted = if poll.has_voted(&claims.sub) {
            " (you voted)"
        } else {
            ""
        };
        body.push_str(&format!(
            "<section><h3>{name}</h3>\
             <small>by {creator} at {date}</small>\
             <p>Agree: {agree} &mdash; Disagree: {disagree}{voted}</p>\
             <form method=\"post\" action=\"/polls\">\
               <input type=\"hidden\" name=\"action\" value=\"vote\">\
               <input type=\"hidden\" name=\"poll_id\" value=\"{id}\">\
               <button name=\"vote_type\" value=\"agree\">Agree</button>\
               <button name=\"vote_type\" value=\"disagree\">Disagree</button>\
               <button name=\"vote_type\" value=\"retract\">Retract vote</button>\
             </form></section>",
            name = html_escape(&poll.name),
            creator = html_escape(&poll.creator),
            date = fmt_time(&poll.created_at),
            agree = poll.votes_agree.len(),
            disagree = poll.votes_disagree.len(),
            id = poll.id,
        ));
    }
    layout("Polls", Some(claims), notice, &body)
}

pub fn render_account(claims: &Claims, profile: &Profile, notice: Option<&str>) -> String {
    let body = format!(
        "<h1>Your account</h1>\
<p><img src=\"/static/uploads/{avatar}\" alt=\"avatar\" width=\"96\"></p>\
<form method=\"post\" action=\"/account\" enctype=\"multipart/form-data\">\
  <label>Bio:<br><textarea name=\"bio\" rows=\"4\" cols=\"48\">{bio}</textarea></label><br>\
  <label>Avatar: <input type=\"file\" name=\"avatar\"></label><br>\
  <button type=\"submit\">Save</button>\
</form>",
        avatar = html_escape(&profile.avatar),
        bio = html_escape(&profile.bio),
    );
    layout("Account", Some(claims), notice, &body)
}

pub fn render_profile(claims: &Claims, user: &User, notice: Option<&str>) -> String {
    let body = format!(
        "<h1>{name}</h1>\
<p><img src=\"/static/uploads/{avatar}\" alt=\"avatar\" width=\"96\"></p>\
<p>{bio}</p>",
        name = html_escape(&user.username),
        avatar = html_escape(&user.profile.avatar),
        bio = html_escape(&user.profile.bio),
    );
    layout(&user.username, Some(claims), notice, &body)
}

pub fn render_admin(claims: &Claims, users: &[User], notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Admin console</h1><h2>Users</h2><table border=\"1\">");
    body.push_str("<tr><th>Username</th><th>Admin</th><th>Bio</th></tr>");
    for user in users {
        body.push_str(&format!(
            "<tr><td><a href=\"/user/{name}\">{name}</a></td><td>{admin}</td><td>{bio}</td></tr>",
            name = html_escape(&user.username),
            admin = if user.is_admin { "yes" } else { "no" },
            bio = html_escape(&user.profile.bio),
        ));
    }
    body.push_str(
        "</table>\
<h2>Add user</h2>\
<form method=\"post\" action=\"/admin\">\
  <input type=\"hidden\" name=\"action\" value=\"add_user\">\
  <label>Username: <input name=\"new_username\"></label>\
  <label>Password: <input name=\"new_password\" type=\"password\"></label>\
  <button type=\"submit\">Add</button>\
</form>\
<h2>Delete user</h2>\
<form method=\"post\" action=\"/admin\">\
  <input type=\"hidden\" name=\"action\" value=\"delete_user\">\
  <label>Username: <input name=\"user_to_delete\"></label>\
  <button type=\"submit\">Delete</button>\
</form>\
<h2>Change password</h2>\
<form method=\"post\" action=\"/admin\">\
  <input type=\"hidden\" name=\"action\" value=\"change_password\">\
  <label>Username: <input name=\"user_to_change\"></label>\
  <label>New password: <input name=\"new_password_value\" type=\"password\"></label>\
  <button type=\"submit\">Change</button>\
</form>",
    );
    layout("Admin", Some(claims), notice, &body)
}
