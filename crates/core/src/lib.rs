pub mod camera {
    pub mod domain {
        pub mod frame_source;
    }
    pub mod infrastructure {
        pub mod nokhwa_frame_source;
    }
}

pub mod emotion {
    pub mod domain {
        pub mod emotion;
        pub mod emotion_classifier;
        pub mod emotion_detector;
        pub mod emotion_scores;
        pub mod face_locator;
        pub mod frame_annotation;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod inference_loop;
    pub mod pipeline_logger;
    pub mod presenter;
    pub mod tick_scheduler;
    pub mod infrastructure {
        pub mod channel_presenter;
        pub mod threaded_loop_runner;
    }
}

pub mod presentation {
    pub mod image_writer;
    pub mod overlay;
    pub mod infrastructure {
        pub mod image_file_writer;
    }
}

pub mod shared {
    pub mod constants;
    pub mod face_box;
    pub mod frame;
    pub mod model_resolver;
}
