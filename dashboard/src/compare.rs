use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::widget::image::Handle;
use iced::{mouse, touch, Color, Point, Rectangle, Renderer, Size, Theme};

use crate::Message;

/// Before/after split view over two co-registered images.
///
/// The canvas reports pointer activity together with its own bounds so
/// the application can feed the comparison-slider controller; the clip
/// boundary itself is derived from the controller's split position.
pub struct CompareView {
    pub before: Handle,
    pub after: Handle,
    pub reveal_fraction: f32,
}

impl canvas::Program<Message> for CompareView {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => cursor
                .position_over(bounds)
                .map(|position| {
                    canvas::Action::publish(Message::SliderDragStarted {
                        x: position.x,
                        left: bounds.x,
                        width: bounds.width,
                    })
                }),
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                // Always reported; the controller ignores moves outside an
                // active drag session.
                Some(canvas::Action::publish(Message::SliderPointerMoved {
                    x: position.x,
                    left: bounds.x,
                    width: bounds.width,
                }))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                Some(canvas::Action::publish(Message::SliderDragEnded))
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                bounds.contains(*position).then(|| {
                    canvas::Action::publish(Message::SliderDragStarted {
                        x: position.x,
                        left: bounds.x,
                        width: bounds.width,
                    })
                })
            }
            canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                Some(canvas::Action::publish(Message::SliderPointerMoved {
                    x: position.x,
                    left: bounds.x,
                    width: bounds.width,
                }))
            }
            canvas::Event::Touch(touch::Event::FingerLifted { .. })
            | canvas::Event::Touch(touch::Event::FingerLost { .. }) => {
                Some(canvas::Action::publish(Message::SliderDragEnded))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let full = Rectangle::new(Point::ORIGIN, frame.size());

        // Base layer: the plain original.
        frame.draw_image(full, &self.before.clone());

        // The "after" layer is revealed for the left fraction of the
        // width; the boundary is the draggable split.
        let split_x = self.reveal_fraction.clamp(0.0, 1.0) * frame.width();
        if split_x > 0.0 {
            let reveal = Rectangle::new(Point::ORIGIN, Size::new(split_x, frame.height()));
            let after = self.after.clone();
            frame.with_clip(reveal, |frame| {
                frame.draw_image(full, &after);
            });
        }

        let boundary = Path::line(
            Point::new(split_x, 0.0),
            Point::new(split_x, frame.height()),
        );
        frame.stroke(
            &boundary,
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb(0.95, 0.95, 0.95)),
        );

        let grip = Path::new(|builder| {
            builder.circle(Point::new(split_x, frame.height() / 2.0), 9.0)
        });
        frame.fill(&grip, Color::from_rgba(0.95, 0.95, 0.95, 0.9));

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::ResizingHorizontally
        } else {
            mouse::Interaction::default()
        }
    }
}
