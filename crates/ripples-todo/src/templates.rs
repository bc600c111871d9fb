use ripples_core::Template;

use crate::model::Todo;

pub fn todo_item(todo: &Todo) -> Template {
    let class = if todo.completed { "completed" } else { "" };
    Template::new("li").class(class).children(vec![
        Template::new("div").class("view").children(vec![
            Template::new("input")
                .class("toggle")
                .prop("type", "checkbox")
                .prop("checked", todo.completed),
            Template::new("label").text(&todo.text),
            Template::new("button").class("destroy"),
        ]),
        Template::new("input")
            .class("edit")
            .prop("value", todo.text.as_str()),
    ])
}

pub fn counter(count: usize) -> Vec<Template> {
    let phrase = if count == 1 { " item left" } else { " items left" };
    vec![
        Template::new("strong").markup(count.to_string()),
        Template::new("span").markup(phrase),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ripples_core::render;

    #[test]
    fn test_todo_item_markup() {
        let done = Todo {
            text: "ship <it>".into(),
            completed: true,
        };
        let frag = render(&[todo_item(&done)]).unwrap();
        assert_snapshot!(
            frag.to_html(),
            @r#"<li class="completed"><div class="view"><input class="toggle" type="checkbox" checked><label>ship &lt;it&gt;</label><button class="destroy"></button></div><input class="edit" value="ship &lt;it&gt;"></li>"#
        );
    }

    #[test]
    fn test_counter_pluralizes() {
        let one = render(&counter(1)).unwrap().to_html();
        assert_eq!(one, "<strong>1</strong><span> item left</span>");
        let many = render(&counter(3)).unwrap().to_html();
        assert_eq!(many, "<strong>3</strong><span> items left</span>");
        let none = render(&counter(0)).unwrap().to_html();
        assert!(none.contains("items left"));
    }
}
