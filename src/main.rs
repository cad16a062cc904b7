use macroquad::prelude::*;
use multiview::{
    Camera, Session, Settings, World,
    application::OutputSize,
    input::{self, DragTracker},
    rendering::{self, MacroquadBackend},
    ui::{self, CELL_SIZE},
};

const MAP_SIZE: usize = 200;
const ENTITY_COUNT: usize = 60;

fn window_conf() -> Conf {
    Conf {
        window_title: "Multi-view camera demo".to_owned(),
        window_width: 1200,
        window_height: 800,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let settings = Settings::from_env_or_default();
    let aspect_ratio = settings.aspect_ratio;
    let mut backend = MacroquadBackend::default();
    let mut session = Session::new(settings);
    session.load_world(World::generate(MAP_SIZE, MAP_SIZE, ENTITY_COUNT), &mut backend);

    let mut camera = Camera::new();
    camera.center_on(
        MAP_SIZE as f32 / 2.0,
        MAP_SIZE as f32 / 2.0,
        (ui::grid_area_width(), ui::grid_area_height()),
        CELL_SIZE,
    );
    let mut drag = DragTracker::new();

    loop {
        session.begin_frame();
        let mouse_pos = mouse_position();

        let mut buttons = ui::create_buttons();
        let has_views = !session.views().is_empty();
        buttons[1].set_enabled(has_views);
        buttons[2].set_enabled(has_views);
        buttons[3].set_enabled(has_views);
        if session.is_paused {
            buttons[4].set_label("Resume");
        }

        // Input first: secondary views must see it before they tick
        input::process_button_clicks(&mut session, &buttons, &mut backend, mouse_pos);
        let mut panels = ui::view_panels(ui::grid_area(), session.views().len(), aspect_ratio);
        let closed = input::handle_view_close(&mut session, &mut backend, &panels, mouse_pos);
        if closed {
            panels = ui::view_panels(ui::grid_area(), session.views().len(), aspect_ratio);
        }
        let hovered = input::pointer_target(mouse_pos, &panels);
        input::handle_zoom(&mut session, &mut camera, hovered, mouse_pos);
        input::handle_pan(&mut session, &mut camera, &mut drag, hovered, mouse_pos);
        // The close click is not also a selection click
        if !closed {
            input::handle_selection(&mut session, &camera, hovered, mouse_pos);
        }
        input::process_keyboard_input(&mut session, &mut camera, &mut backend);

        // Views drawn at the size of their panels
        let panels = ui::view_panels(ui::grid_area(), session.views().len(), aspect_ratio);
        for (index, panel) in panels.iter().enumerate() {
            if let Some(view) = session.views_mut().view_mut(index) {
                view.set_output_size(OutputSize::new(panel.content.w as u32, panel.content.h as u32));
            }
        }

        // Secondary views tick and register before the primary view queries the registry
        session.update(get_frame_time(), &mut backend);

        clear_background(backend.clear_color);
        let primary = camera.visible_rect(ui::grid_area_width(), ui::grid_area_height(), CELL_SIZE);
        let cull = session.effective_view_rect(primary);
        if let Some(world) = session.world() {
            rendering::draw_world(world, &camera, cull, session.selected);
        }
        rendering::draw_viewport_outlines(session.registry().active_rects(), &camera);
        rendering::draw_view_panels(session.views(), &panels, mouse_pos);
        rendering::draw_controls(&session, &camera, &buttons, mouse_pos);

        next_frame().await;
    }
}
