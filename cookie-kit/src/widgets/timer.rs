//! Timer widget
//!
//! Renders the local time and re-renders it every second through the event
//! loop, for as long as the loop runs.

use std::time::Duration;

use crate::elements::{EventLoop, MountResult, PropMap, RenderCallback, Widget};

use super::example::display_prop;

/// Time of day as shown by the widget, e.g. `9:05:03 AM`
pub const TIME_FORMAT: &str = "%-I:%M:%S %p";

const TICK: Duration = Duration::from_secs(1);

/// A clock bound to an event loop.
#[derive(Debug, Clone)]
pub struct ExampleTimer {
    event_loop: EventLoop,
}

impl ExampleTimer {
    pub fn new(event_loop: EventLoop) -> Self {
        ExampleTimer { event_loop }
    }

    fn markup(props: &PropMap, time: &str) -> String {
        format!(
            r#"
          <div class="block-text border border-red-500 p-5">
            <h1>Example Function Client Component</h1>
            <h4>Hello, {world}!</h4>
            <p>Example function component content</p>
            <p>{another}</p>
            <p class="animate-fade-in">{time}</p>
            <p>
            This is a function component that is registered as a custom element.
            </p>
            <h4>Props:</h4>
            <pre><code>{json}</code></pre>
          </div>"#,
            world = display_prop(props, "world"),
            another = display_prop(props, "anotherAttribute"),
            json = props.to_pretty_json(),
        )
    }
}

impl Widget for ExampleTimer {
    fn mount(&self, props: &PropMap, render: &RenderCallback) -> MountResult {
        let now = self.event_loop.wall_clock().format(TIME_FORMAT).to_string();
        render.render(Self::markup(props, &now));

        let props = props.clone();
        let ticking = render.clone();
        let event_loop = self.event_loop.clone();
        // Never cancelled here; the element's owner may call `teardown`.
        let interval = self.event_loop.set_interval(TICK, move || {
            let now = event_loop.wall_clock().format(TIME_FORMAT).to_string();
            ticking.render(Self::markup(&props, &now));
        });
        render.retain(interval);

        Ok(None)
    }
}
