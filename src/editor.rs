use atomic_float::AtomicF32;
use nih_plug::prelude::{util, Editor, GuiContext};
use nih_plug_iced::widgets as nih_widgets;
use nih_plug_iced::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::params::FilterParams;

pub(crate) fn default_state() -> Arc<IcedState> {
    IcedState::from_size(400, 360)
}

pub(crate) fn create(
    params: Arc<FilterParams>,
    peak_meter: Arc<AtomicF32>,
    editor_state: Arc<IcedState>,
) -> Option<Box<dyn Editor>> {
    create_iced_editor::<FilterEditor>(editor_state, (params, peak_meter))
}

struct FilterEditor {
    params: Arc<FilterParams>,
    context: Arc<dyn GuiContext>,

    /// Output level, stored as voltage gain.
    peak_meter: Arc<AtomicF32>,

    cutoff_slider_state: nih_widgets::param_slider::State,
    resonance_slider_state: nih_widgets::param_slider::State,
    mode_slider_state: nih_widgets::param_slider::State,
    mix_slider_state: nih_widgets::param_slider::State,
    bypass_slider_state: nih_widgets::param_slider::State,
    peak_meter_state: nih_widgets::peak_meter::State,
}

#[derive(Debug, Clone, Copy)]
enum Message {
    /// Update a parameter's value.
    ParamUpdate(nih_widgets::ParamMessage),
}

impl IcedEditor for FilterEditor {
    type Executor = executor::Default;
    type Message = Message;
    type InitializationFlags = (Arc<FilterParams>, Arc<AtomicF32>);

    fn new(
        (params, peak_meter): Self::InitializationFlags,
        context: Arc<dyn GuiContext>,
    ) -> (Self, Command<Self::Message>) {
        let editor = FilterEditor {
            params,
            context,

            peak_meter,

            cutoff_slider_state: Default::default(),
            resonance_slider_state: Default::default(),
            mode_slider_state: Default::default(),
            mix_slider_state: Default::default(),
            bypass_slider_state: Default::default(),
            peak_meter_state: Default::default(),
        };

        (editor, Command::none())
    }

    fn context(&self) -> &dyn GuiContext {
        self.context.as_ref()
    }

    fn update(
        &mut self,
        _window: &mut WindowQueue,
        message: Self::Message,
    ) -> Command<Self::Message> {
        match message {
            Message::ParamUpdate(message) => self.handle_param_message(message),
        }

        Command::none()
    }

    fn view(&mut self) -> Element<'_, Self::Message> {
        Column::new()
            .align_items(Alignment::Center)
            .padding(20)
            .spacing(10)
            .push(
                Text::new("SVF Filter")
                    .font(assets::NOTO_SANS_LIGHT)
                    .size(24)
                    .height(30.into())
                    .width(Length::Fill)
                    .horizontal_alignment(alignment::Horizontal::Center)
                    .vertical_alignment(alignment::Vertical::Bottom),
            )
            .push(
                nih_widgets::ParamSlider::new(&mut self.cutoff_slider_state, &self.params.cutoff)
                    .map(Message::ParamUpdate),
            )
            .push(
                nih_widgets::ParamSlider::new(
                    &mut self.resonance_slider_state,
                    &self.params.resonance,
                )
                .map(Message::ParamUpdate),
            )
            .push(
                nih_widgets::ParamSlider::new(&mut self.mode_slider_state, &self.params.mode)
                    .map(Message::ParamUpdate),
            )
            .push(
                nih_widgets::ParamSlider::new(&mut self.mix_slider_state, &self.params.mix)
                    .map(Message::ParamUpdate),
            )
            .push(
                nih_widgets::ParamSlider::new(&mut self.bypass_slider_state, &self.params.bypass)
                    .map(Message::ParamUpdate),
            )
            .push(Space::with_height(20.into()))
            .push(
                nih_widgets::PeakMeter::new(
                    &mut self.peak_meter_state,
                    util::gain_to_db(self.peak_meter.load(Ordering::Relaxed)),
                )
                .hold_time(Duration::from_millis(600)),
            )
            .into()
    }

    fn background_color(&self) -> nih_plug_iced::Color {
        nih_plug_iced::Color {
            r: 0.98,
            g: 0.98,
            b: 0.98,
            a: 1.0,
        }
    }
}
